use statrs::distribution::{
    ContinuousCDF,
    StudentsT,
};

use crate::errors::{
    FmrsError,
    Result,
};

/// Pearson product-moment correlation between two series of the same length.
///
/// Returns `NaN` when either series has zero variance (or contains `NaN`),
/// callers decide how to treat those.
///
/// # Example
///
/// ```
/// use fmrs::stats::correlation::pearson;
///
/// let a = vec![1.0, 2.0, 3.0, 4.0];
/// let b = vec![2.0, 4.0, 6.0, 8.0];
/// assert!((pearson(&a, &b).unwrap() - 1.0).abs() < 1e-12);
/// assert!(pearson(&a, &[1.0, 1.0, 1.0, 1.0]).unwrap().is_nan());
/// ```
pub fn pearson(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(FmrsError::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
            context: "pearson".to_string(),
        });
    }
    if a.len() < 2 || is_constant(a) || is_constant(b) {
        return Ok(f64::NAN);
    }

    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    // NaN inputs fall through here as well since NaN > 0.0 is false.
    if !(var_a > 0.0 && var_b > 0.0) {
        return Ok(f64::NAN);
    }
    // Rounding can push |r| slightly past 1.
    Ok((cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0))
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|&x| x == values[0])
}

/// Two-sided p-value of a Pearson coefficient `r` over `n` pairs.
///
/// Uses the t statistic `r * sqrt((n - 2) / (1 - r^2))` with `n - 2` degrees
/// of freedom. `NaN` for `NaN` input or fewer than 3 pairs, `0` for a perfect
/// correlation.
pub fn pearson_p_value(r: f64, n: usize) -> f64 {
    if r.is_nan() || n < 3 {
        return f64::NAN;
    }
    let r_abs = r.abs();
    if r_abs >= 1.0 {
        return 0.0;
    }
    let df = (n - 2) as f64;
    let t = r_abs * (df / (1.0 - r_abs * r_abs)).sqrt();
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(t)).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}

/// Correlation coefficient together with its two-sided p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PearsonResult {
    pub r: f64,
    pub p_value: f64,
}

impl PearsonResult {
    pub fn is_degenerate(&self) -> bool {
        self.r.is_nan()
    }
}

pub fn pearson_with_p_value(a: &[f64], b: &[f64]) -> Result<PearsonResult> {
    let r = pearson(a, b)?;
    Ok(PearsonResult {
        r,
        p_value: pearson_p_value(r, a.len()),
    })
}
