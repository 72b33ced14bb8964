use serde::{
    Deserialize,
    Serialize,
};
use std::fmt::Display;

use super::shift_scan::ShiftScan;

/// Thresholds used to decide whether a correlation is reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// |r| above this is reported as significant (r^2 = 0.5).
    pub significant: f64,
    pub possible: f64,
    /// Cells with a p-value at or above this are ignored.
    pub p_value: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            significant: 0.707,
            possible: 0.5,
            p_value: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    Significant,
    Possible,
    None,
}

/// Best positive or negative correlation of one metabolite across shifts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremum {
    /// Masked correlation rounded to two decimals.
    pub correlation: f64,
    pub shift: usize,
    pub p_value: f64,
    pub significance: Significance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub metabolite: String,
    pub max: Extremum,
    pub min: Extremum,
}

impl ClassificationResult {
    /// The extrema carrying a classification, positive first.
    pub fn findings(&self) -> impl Iterator<Item = &Extremum> {
        [&self.max, &self.min]
            .into_iter()
            .filter(|e| e.significance != Significance::None)
    }
}

impl Display for ClassificationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for extremum in self.findings() {
            let label = match extremum.significance {
                Significance::Significant => "Significant",
                Significance::Possible => "Possible   ",
                Significance::None => continue,
            };
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(
                f,
                "{} correlation = {:.2} (p={}) in metabolite \"{}\" at shift {}",
                label,
                extremum.correlation,
                scientific(extremum.p_value),
                self.metabolite,
                extremum.shift
            )?;
        }
        Ok(())
    }
}

/// Two decimals with a signed exponent of at least two digits, `1.20E-04`.
fn scientific(value: f64) -> String {
    let formatted = format!("{:.2E}", value);
    let Some((mantissa, exponent)) = formatted.split_once('E') else {
        return formatted;
    };
    match exponent.parse::<i32>() {
        Ok(exp) => format!(
            "{}E{}{:02}",
            mantissa,
            if exp < 0 { '-' } else { '+' },
            exp.unsigned_abs()
        ),
        Err(_) => formatted,
    }
}

/// Outcome of the classification of a whole shift scan.
#[derive(Debug, Clone, PartialEq)]
pub enum SignificanceReport {
    Found(Vec<ClassificationResult>),
    NoCorrelations { thresholds: Thresholds },
}

impl SignificanceReport {
    pub fn results(&self) -> &[ClassificationResult] {
        match self {
            SignificanceReport::Found(results) => results,
            SignificanceReport::NoCorrelations { .. } => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SignificanceReport::NoCorrelations { .. })
    }
}

impl Display for SignificanceReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignificanceReport::Found(results) => {
                for (i, res) in results.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}", res)?;
                }
                Ok(())
            }
            SignificanceReport::NoCorrelations { thresholds } => write!(
                f,
                "No correlations found (correlation>{}, p<{})",
                thresholds.significant, thresholds.p_value
            ),
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// First index for which `better` holds against every earlier value.
fn arg_extreme(row: &[f64], better: impl Fn(f64, f64) -> bool) -> usize {
    let mut best = 0;
    for (i, &x) in row.iter().enumerate().skip(1) {
        if better(x, row[best]) {
            best = i;
        }
    }
    best
}

fn classify_positive(value: f64, thresholds: &Thresholds) -> Significance {
    if value > thresholds.significant {
        Significance::Significant
    } else if value > thresholds.possible {
        Significance::Possible
    } else {
        Significance::None
    }
}

fn classify_negative(value: f64, thresholds: &Thresholds) -> Significance {
    classify_positive(-value, thresholds)
}

/// Zeroes every cell that is not statistically significant.
///
/// `NaN` correlations and `NaN` p-values count as not significant.
pub fn masked_row(correlation: &[f64], p_value: &[f64], p_threshold: f64) -> Vec<f64> {
    correlation
        .iter()
        .zip(p_value.iter())
        .map(|(&r, &p)| {
            if r.is_nan() || !(p < p_threshold) {
                0.0
            } else {
                r
            }
        })
        .collect()
}

/// Finds, per metabolite, the strongest positive and negative correlation
/// that passes the p-value gate and classifies both.
///
/// # Example
///
/// ```
/// use fmrs::models::Array2D;
/// use fmrs::stats::{classify, ShiftScan, Thresholds};
///
/// let scan = ShiftScan {
///     metabolite_names: vec!["NAA".to_string()],
///     correlation: Array2D::new(vec![vec![0.2, 0.9, -0.6]]).unwrap(),
///     p_value: Array2D::new(vec![vec![0.5, 0.001, 0.01]]).unwrap(),
///     degenerate: vec![],
/// };
/// let report = classify(&scan, &Thresholds::default());
/// let res = &report.results()[0];
/// assert_eq!(res.max.shift, 1);
/// assert_eq!(res.min.correlation, -0.6);
/// ```
pub fn classify(scan: &ShiftScan, thresholds: &Thresholds) -> SignificanceReport {
    let mut results = Vec::new();
    for (i, name) in scan.metabolite_names.iter().enumerate() {
        let (Some(corr_row), Some(p_row)) = (scan.correlation.get_row(i), scan.p_value.get_row(i))
        else {
            continue;
        };
        if corr_row.is_empty() {
            continue;
        }
        let masked = masked_row(corr_row, p_row, thresholds.p_value);

        let imax = arg_extreme(&masked, |a, b| a > b);
        let imin = arg_extreme(&masked, |a, b| a < b);
        let max_value = round2(masked[imax]);
        let min_value = round2(masked[imin]);

        let result = ClassificationResult {
            metabolite: name.clone(),
            max: Extremum {
                correlation: max_value,
                shift: imax,
                p_value: p_row[imax],
                significance: classify_positive(max_value, thresholds),
            },
            min: Extremum {
                correlation: min_value,
                shift: imin,
                p_value: p_row[imin],
                significance: classify_negative(min_value, thresholds),
            },
        };
        if result.findings().next().is_some() {
            results.push(result);
        }
    }

    if results.is_empty() {
        SignificanceReport::NoCorrelations {
            thresholds: *thresholds,
        }
    } else {
        SignificanceReport::Found(results)
    }
}
