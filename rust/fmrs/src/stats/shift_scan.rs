use rayon::prelude::*;
use tracing::{
    debug,
    warn,
};

use super::correlation::pearson_with_p_value;
use crate::errors::{
    FmrsError,
    Result,
};
use crate::models::{
    Array2D,
    MetaboliteMatrix,
};

/// A metabolite/shift pair whose correlation could not be computed
/// (one of the series has zero variance).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegenerateSeries {
    pub metabolite: usize,
    pub shift: usize,
}

/// Raw output of the shift scan.
///
/// Both matrices are shaped `[n_metabolites, max_shift]`; entry `(i, j)` is the
/// correlation between the smoothed paradigm and metabolite `i` delayed by
/// `j` samples. `NaN` entries are kept as computed.
#[derive(Debug, Clone)]
pub struct ShiftScan {
    pub metabolite_names: Vec<String>,
    pub correlation: Array2D,
    pub p_value: Array2D,
    pub degenerate: Vec<DegenerateSeries>,
}

impl ShiftScan {
    pub fn n_metabolites(&self) -> usize {
        self.correlation.nrows()
    }

    pub fn max_shift(&self) -> usize {
        self.correlation.ncols()
    }
}

/// Correlates `paradigm` against every metabolite column for shifts
/// `0..max_shift`.
///
/// The metabolite series must be long enough for the last shift,
/// `n_samples >= paradigm.len() + max_shift - 1`.
///
/// Metabolites are processed in parallel; the returned matrices and the
/// degenerate-series warnings are in metabolite-major, then shift order.
pub fn correlate(
    paradigm: &[f64],
    metabolites: &MetaboliteMatrix,
    max_shift: usize,
) -> Result<ShiftScan> {
    let len = paradigm.len();
    if max_shift == 0 || len < 3 {
        return Err(FmrsError::configuration(format!(
            "shift scan needs max_shift >= 1 and at least 3 paradigm samples (got {} and {})",
            max_shift, len
        )));
    }
    let required = len + max_shift - 1;
    if metabolites.n_samples() < required {
        return Err(FmrsError::DimensionMismatch {
            expected: required,
            found: metabolites.n_samples(),
            context: format!(
                "metabolite series too short for {} paradigm samples and {} shifts",
                len, max_shift
            ),
        });
    }

    let n_metabolites = metabolites.n_metabolites();
    debug!(
        "Scanning {} metabolites over {} shifts ({} samples each)",
        n_metabolites, max_shift, len
    );

    let per_metabolite: Vec<Vec<(f64, f64)>> = (0..n_metabolites)
        .into_par_iter()
        .map(|i| -> Result<Vec<(f64, f64)>> {
            let series = metabolites.metabolite(i).ok_or_else(|| {
                FmrsError::DimensionMismatch {
                    expected: n_metabolites,
                    found: i,
                    context: "metabolite column lookup".to_string(),
                }
            })?;
            (0..max_shift)
                .map(|j| -> Result<(f64, f64)> {
                    let res = pearson_with_p_value(paradigm, &series[j..j + len])
                        .map_err(|e| e.append_to_context(&format!(" (shift {})", j)))?;
                    Ok((res.r, res.p_value))
                })
                .collect()
        })
        .collect::<Result<_>>()?;

    let mut correlation = Array2D::filled(n_metabolites, max_shift, f64::NAN);
    let mut p_value = Array2D::filled(n_metabolites, max_shift, f64::NAN);
    let mut degenerate = Vec::new();
    let names = metabolites.metabolite_names();
    for (i, row) in per_metabolite.into_iter().enumerate() {
        for (j, (r, p)) in row.into_iter().enumerate() {
            if r.is_nan() {
                warn!(
                    "Degenerate series for metabolite \"{}\" at shift {}, correlation is NaN",
                    names[i], j
                );
                degenerate.push(DegenerateSeries {
                    metabolite: i,
                    shift: j,
                });
            }
            correlation.set(i, j, r);
            p_value.set(i, j, p);
        }
    }

    Ok(ShiftScan {
        metabolite_names: names.to_vec(),
        correlation,
        p_value,
        degenerate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        smooth,
        trim,
        ParadigmConfig,
        QuantifiedRow,
        WindowSize,
    };

    fn matrix_from_columns(columns: &[(&str, Vec<f64>)]) -> MetaboliteMatrix {
        let n = columns[0].1.len();
        let mut names: Vec<String> = vec!["Row".into(), "Col".into(), "Slice".into()];
        names.extend(columns.iter().map(|(name, _)| name.to_string()));
        let rows = (0..n)
            .map(|t| {
                let mut values = vec![1.0, 1.0, 1.0];
                values.extend(columns.iter().map(|(_, c)| c[t]));
                QuantifiedRow {
                    names: names.clone(),
                    values,
                }
            })
            .collect();
        MetaboliteMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_identical_series_shift_zero() {
        let paradigm = ParadigmConfig::default().build(360).unwrap();
        let smoothed = smooth(&paradigm, WindowSize::new(1).unwrap());
        let trimmed = trim(smoothed, 60).unwrap();
        assert_eq!(trimmed.len(), 300);

        let matrix = matrix_from_columns(&[("NAA", paradigm.clone())]);
        let scan = correlate(&trimmed, &matrix, 60).unwrap();
        assert_eq!(scan.n_metabolites(), 1);
        assert_eq!(scan.max_shift(), 60);
        assert!((scan.correlation.get(0, 0).unwrap() - 1.0).abs() < 1e-9);
        assert!(scan.p_value.get(0, 0).unwrap() < 1e-12);
        // A full block later the series is anti-aligned.
        assert!(scan.correlation.get(0, 59).unwrap() < 0.0);
    }

    #[test]
    fn test_shifted_series_found_at_lag() {
        let paradigm = ParadigmConfig::default().build(360).unwrap();
        let smoothed = smooth(&paradigm, WindowSize::new(5).unwrap());
        let trimmed = trim(smoothed.clone(), 60).unwrap();
        // Response delayed by 7 samples
        let delayed: Vec<f64> = (0..360)
            .map(|t| if t >= 7 { smoothed[t - 7] } else { 0.0 })
            .collect();
        let matrix = matrix_from_columns(&[("Glu", delayed)]);
        let scan = correlate(&trimmed, &matrix, 60).unwrap();
        let row = scan.correlation.get_row(0).unwrap();
        let best = row
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap()
            .0;
        assert_eq!(best, 7);
    }

    #[test]
    fn test_constant_series_is_nan() {
        let paradigm = ParadigmConfig::default().build(360).unwrap();
        let trimmed = trim(paradigm.clone(), 60).unwrap();
        let matrix = matrix_from_columns(&[("NAA", paradigm), ("Cr", vec![4.2; 360])]);
        let scan = correlate(&trimmed, &matrix, 60).unwrap();
        let constant = scan.correlation.get_row(1).unwrap();
        assert!(constant.iter().all(|x| x.is_nan()));
        assert!(scan.p_value.get_row(1).unwrap().iter().all(|x| x.is_nan()));
        assert_eq!(scan.degenerate.len(), 60);
        assert!(scan.degenerate.iter().all(|d| d.metabolite == 1));
        assert_eq!(scan.degenerate[0].shift, 0);
        assert_eq!(scan.degenerate[59].shift, 59);
    }

    #[test]
    fn test_dimension_mismatch() {
        let matrix = matrix_from_columns(&[("NAA", (0..10).map(|x| x as f64).collect())]);
        let paradigm: Vec<f64> = (0..8).map(|x| (x % 2) as f64).collect();
        // needs 8 + 4 - 1 = 11 rows
        let res = correlate(&paradigm, &matrix, 4);
        assert!(matches!(
            res,
            Err(FmrsError::DimensionMismatch {
                expected: 11,
                found: 10,
                ..
            })
        ));
        // 8 + 3 - 1 = 10 is enough
        assert!(correlate(&paradigm, &matrix, 3).is_ok());
    }

    #[test]
    fn test_reserved_columns_only() {
        let names: Vec<String> = vec!["Row".into(), "Col".into(), "Slice".into()];
        let rows = (0..10)
            .map(|_| QuantifiedRow {
                names: names.clone(),
                values: vec![1.0, 1.0, 1.0],
            })
            .collect();
        let matrix = MetaboliteMatrix::from_rows(rows).unwrap();
        let paradigm: Vec<f64> = (0..8).map(|x| (x % 2) as f64).collect();
        let scan = correlate(&paradigm, &matrix, 2).unwrap();
        assert_eq!(scan.n_metabolites(), 0);
        assert!(scan.metabolite_names.is_empty());
    }
}
