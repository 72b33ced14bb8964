use tracing::{
    debug,
    info,
};

use crate::errors::{
    FmrsError,
    Result,
};
use crate::models::{
    plan_all,
    MetaboliteMatrix,
    WindowSize,
};
use crate::traits::WindowQuantifier;

/// Quantifies every sliding window of an `total`-acquisition series.
///
/// Windows are handed to `quantifier` in target order `1..=total`.
/// `on_window` is called after each successful window with the 1-based
/// target index, for progress reporting. The first failing window aborts
/// the run and no rows are returned.
///
/// ```
/// use fmrs::models::{QuantifiedRow, WindowSize};
/// use fmrs::pipeline::run_sliding_window;
/// use fmrs::WindowQuantifier;
///
/// struct WindowLength;
///
/// impl WindowQuantifier for WindowLength {
///     fn quantify(&mut self, window: &[usize]) -> fmrs::Result<QuantifiedRow> {
///         Ok(QuantifiedRow {
///             names: ["Row", "Col", "Slice", "len"].map(String::from).to_vec(),
///             values: vec![1.0, 1.0, 1.0, window.len() as f64],
///         })
///     }
/// }
///
/// let matrix = run_sliding_window(&mut WindowLength, WindowSize::new(3).unwrap(), 5, |_| {}).unwrap();
/// assert_eq!(matrix.metabolite(0).unwrap(), vec![2.0, 3.0, 3.0, 3.0, 2.0]);
/// ```
pub fn run_sliding_window<Q: WindowQuantifier>(
    quantifier: &mut Q,
    window_size: WindowSize,
    total: usize,
    mut on_window: impl FnMut(usize),
) -> Result<MetaboliteMatrix> {
    if total == 0 {
        return Err(FmrsError::configuration(
            "cannot slide a window over an empty acquisition series",
        ));
    }
    info!(
        "Quantifying {} windows of size {} (offset {})",
        total,
        window_size,
        window_size.offset()
    );

    let mut rows = Vec::with_capacity(total);
    for (i, window) in plan_all(window_size, total).enumerate() {
        let target = i + 1;
        debug!("Window {} of {}: {:?}", target, total, window);
        let row = quantifier
            .quantify(&window)
            .map_err(|e| e.append_to_context(&format!(" (window {} of {})", target, total)))?;
        rows.push(row);
        on_window(target);
    }

    MetaboliteMatrix::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuantifiedRow;

    struct Recording {
        seen: Vec<Vec<usize>>,
        fail_at: Option<usize>,
    }

    impl WindowQuantifier for Recording {
        fn quantify(&mut self, window: &[usize]) -> Result<QuantifiedRow> {
            self.seen.push(window.to_vec());
            if Some(self.seen.len()) == self.fail_at {
                return Err(FmrsError::ExternalTool {
                    program: "fake".to_string(),
                    status: Some(1),
                    context: String::new(),
                });
            }
            Ok(QuantifiedRow {
                names: vec!["Row".into(), "Col".into(), "Slice".into(), "NAA".into()],
                values: vec![1.0, 1.0, 1.0, window.iter().sum::<usize>() as f64],
            })
        }
    }

    #[test]
    fn test_windows_in_target_order() {
        let mut q = Recording {
            seen: vec![],
            fail_at: None,
        };
        let mut progress = vec![];
        let matrix =
            run_sliding_window(&mut q, WindowSize::new(3).unwrap(), 12, |t| progress.push(t))
                .unwrap();
        assert_eq!(q.seen.len(), 12);
        assert_eq!(q.seen[0], vec![1, 2]);
        assert_eq!(q.seen[1], vec![1, 2, 3]);
        assert_eq!(q.seen[11], vec![11, 12]);
        assert_eq!(progress, (1..=12).collect::<Vec<_>>());
        assert_eq!(matrix.n_samples(), 12);
        assert_eq!(matrix.metabolite(0).unwrap()[0], 3.0);
    }

    #[test]
    fn test_failure_aborts_run() {
        let mut q = Recording {
            seen: vec![],
            fail_at: Some(4),
        };
        let mut calls = 0;
        let res = run_sliding_window(&mut q, WindowSize::new(5).unwrap(), 10, |_| calls += 1);
        assert!(matches!(res, Err(FmrsError::ExternalTool { .. })));
        assert_eq!(q.seen.len(), 4);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_empty_series() {
        let mut q = Recording {
            seen: vec![],
            fail_at: None,
        };
        assert!(run_sliding_window(&mut q, WindowSize::new(1).unwrap(), 0, |_| {}).is_err());
    }
}
