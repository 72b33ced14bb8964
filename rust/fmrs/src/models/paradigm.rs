use serde::{
    Deserialize,
    Serialize,
};
use tracing::debug;

use crate::errors::{
    FmrsError,
    Result,
};
use crate::models::window::{
    window_range,
    WindowSize,
};

/// Stimulus on/off schedule of an experiment.
///
/// `on_intervals` are half-open `[start, end)` ranges of 0-based sample
/// indices during which the stimulus is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParadigmConfig {
    pub length: usize,
    pub on_intervals: Vec<(usize, usize)>,
}

impl Default for ParadigmConfig {
    /// Block design of 6 blocks of 60 dynamics, stimulus on in every other one.
    fn default() -> Self {
        Self {
            length: 360,
            on_intervals: vec![(60, 120), (180, 240), (300, 360)],
        }
    }
}

impl ParadigmConfig {
    pub fn validate(&self) -> Result<()> {
        if self.length == 0 {
            return Err(FmrsError::configuration("paradigm length must be > 0"));
        }
        for &(start, end) in self.on_intervals.iter() {
            if start >= end || end > self.length {
                return Err(FmrsError::configuration(format!(
                    "paradigm interval [{}, {}) is empty or outside of [0, {})",
                    start, end, self.length
                )));
            }
        }
        Ok(())
    }

    /// Builds the binary paradigm vector for an acquisition series of
    /// `total` samples.
    ///
    /// ```
    /// use fmrs::models::ParadigmConfig;
    ///
    /// let config = ParadigmConfig { length: 6, on_intervals: vec![(2, 4)] };
    /// assert_eq!(config.build(6).unwrap(), vec![0., 0., 1., 1., 0., 0.]);
    /// assert!(config.build(7).is_err());
    /// ```
    pub fn build(&self, total: usize) -> Result<Vec<f64>> {
        self.validate()?;
        if total != self.length {
            return Err(FmrsError::configuration(format!(
                "dimension mismatch of CSV data ({}) and paradigm ({})",
                total, self.length
            )));
        }
        let mut paradigm = vec![0.0; self.length];
        for &(start, end) in self.on_intervals.iter() {
            paradigm[start..end].iter_mut().for_each(|x| *x = 1.0);
        }
        debug!(
            "Built paradigm of length {} with {} stimulus blocks",
            self.length,
            self.on_intervals.len()
        );
        Ok(paradigm)
    }
}

/// Sliding-window mean of `values`, using the same windows the acquisitions
/// are averaged with.
///
/// Truncated windows at either end are averaged over the samples they
/// actually contain.
pub fn smooth(values: &[f64], window_size: WindowSize) -> Vec<f64> {
    let total = values.len();
    (1..=total)
        .map(|target| {
            let range = window_range(target, window_size, total);
            let n = range.end() - range.start() + 1;
            let window = &values[range.start() - 1..*range.end()];
            window.iter().sum::<f64>() / n as f64
        })
        .collect()
}

/// Drops the last `max_shift` samples so that every shift of the scan stays
/// within the metabolite series.
pub fn trim(mut values: Vec<f64>, max_shift: usize) -> Result<Vec<f64>> {
    if max_shift >= values.len() {
        return Err(FmrsError::configuration(format!(
            "maximum shift ({}) must be smaller than the paradigm length ({})",
            max_shift,
            values.len()
        )));
    }
    values.truncate(values.len() - max_shift);
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paradigm() {
        let paradigm = ParadigmConfig::default().build(360).unwrap();
        assert_eq!(paradigm.len(), 360);
        assert_eq!(paradigm.iter().sum::<f64>(), 180.0);
        assert_eq!(paradigm[59], 0.0);
        assert_eq!(paradigm[60], 1.0);
        assert_eq!(paradigm[119], 1.0);
        assert_eq!(paradigm[120], 0.0);
        assert_eq!(paradigm[359], 1.0);
    }

    #[test]
    fn test_paradigm_length_mismatch() {
        let res = ParadigmConfig::default().build(300);
        assert!(matches!(res, Err(FmrsError::Configuration { .. })));
    }

    #[test]
    fn test_paradigm_bad_interval() {
        let config = ParadigmConfig {
            length: 10,
            on_intervals: vec![(5, 11)],
        };
        assert!(config.build(10).is_err());
        let config = ParadigmConfig {
            length: 10,
            on_intervals: vec![(5, 5)],
        };
        assert!(config.build(10).is_err());
    }

    #[test]
    fn test_smooth_identity() {
        let paradigm = ParadigmConfig::default().build(360).unwrap();
        let smoothed = smooth(&paradigm, WindowSize::new(1).unwrap());
        assert_eq!(smoothed, paradigm);
    }

    #[test]
    fn test_smooth_truncated_edges() {
        let values = vec![0., 0., 1., 1., 1., 0.];
        let smoothed = smooth(&values, WindowSize::new(3).unwrap());
        let expected = [0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0, 2.0 / 3.0, 0.5];
        for (got, want) in smoothed.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-12, "{:?}", smoothed);
        }
    }

    #[test]
    fn test_smooth_even_window() {
        // w = 4 averages [t-2, t+1]
        let values = vec![0., 4., 8., 12., 16.];
        let smoothed = smooth(&values, WindowSize::new(4).unwrap());
        assert_eq!(smoothed, vec![2.0, 4.0, 6.0, 10.0, 12.0]);
    }

    #[test]
    fn test_smooth_stays_in_unit_interval() {
        let paradigm = ParadigmConfig::default().build(360).unwrap();
        for w in [2, 5, 10, 31, 50] {
            let smoothed = smooth(&paradigm, WindowSize::new(w).unwrap());
            assert_eq!(smoothed.len(), 360);
            assert!(smoothed.iter().all(|x| (0.0..=1.0).contains(x)));
        }
    }

    #[test]
    fn test_trim() {
        let trimmed = trim(vec![1., 2., 3., 4.], 1).unwrap();
        assert_eq!(trimmed, vec![1., 2., 3.]);
        assert!(trim(vec![1., 2.], 2).is_err());

        let paradigm = ParadigmConfig::default().build(360).unwrap();
        let smoothed = smooth(&paradigm, WindowSize::new(1).unwrap());
        assert_eq!(trim(smoothed, 60).unwrap().len(), 300);
    }
}
