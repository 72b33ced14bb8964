use serde::{
    Deserialize,
    Serialize,
};

use crate::errors::{
    FmrsError,
    Result,
};

pub const MIN_WINDOW_SIZE: usize = 1;
pub const MAX_WINDOW_SIZE: usize = 50;

/// Number of neighbouring acquisitions averaged into one output sample.
///
/// Always within `1..=50`, checked on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct WindowSize(usize);

impl WindowSize {
    pub fn new(size: usize) -> Result<Self> {
        if !(MIN_WINDOW_SIZE..=MAX_WINDOW_SIZE).contains(&size) {
            return Err(FmrsError::configuration(format!(
                "sliding window must be within {}..={}, got {}",
                MIN_WINDOW_SIZE, MAX_WINDOW_SIZE, size
            )));
        }
        Ok(Self(size))
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Number of samples taken before the target, `floor(w / 2)`.
    pub fn offset(self) -> usize {
        self.0 / 2
    }
}

impl TryFrom<usize> for WindowSize {
    type Error = FmrsError;

    fn try_from(value: usize) -> Result<Self> {
        Self::new(value)
    }
}

impl From<WindowSize> for usize {
    fn from(value: WindowSize) -> Self {
        value.0
    }
}

impl std::fmt::Display for WindowSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Acquisition indices (1-based) averaged together for `target`.
///
/// The nominal window is `[target - floor(w/2), target - floor(w/2) + w - 1]`,
/// anything outside `[1, total]` is dropped, so windows near either end of the
/// sequence are shorter and asymmetric.
///
/// ```
/// use fmrs::models::{plan, WindowSize};
///
/// let w = WindowSize::new(3).unwrap();
/// assert_eq!(plan(1, w, 12), vec![1, 2]);
/// assert_eq!(plan(2, w, 12), vec![1, 2, 3]);
/// assert_eq!(plan(12, w, 12), vec![11, 12]);
/// ```
pub fn plan(target: usize, window_size: WindowSize, total: usize) -> Vec<usize> {
    debug_assert!(
        (1..=total).contains(&target),
        "target {} outside 1..={}",
        target,
        total
    );
    window_range(target, window_size, total).collect()
}

/// Same as [`plan`] but for every target in `1..=total`, in order.
pub fn plan_all(
    window_size: WindowSize,
    total: usize,
) -> impl ExactSizeIterator<Item = Vec<usize>> {
    (0..total).map(move |i| plan(i + 1, window_size, total))
}

/// Range form of [`plan`], used when averaging slices without allocating.
pub(crate) fn window_range(
    target: usize,
    window_size: WindowSize,
    total: usize,
) -> std::ops::RangeInclusive<usize> {
    // Signed arithmetic, the nominal start can be below 1.
    let start = target as isize - window_size.offset() as isize;
    let end = start + window_size.get() as isize - 1;
    let start = start.max(1) as usize;
    let end = end.min(total as isize).max(0) as usize;
    start..=end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(size: usize) -> WindowSize {
        WindowSize::new(size).unwrap()
    }

    #[test]
    fn test_window_size_bounds() {
        assert!(WindowSize::new(0).is_err());
        assert!(WindowSize::new(51).is_err());
        assert_eq!(WindowSize::new(1).unwrap().get(), 1);
        assert_eq!(WindowSize::new(50).unwrap().get(), 50);
    }

    #[test]
    fn test_window_size_serde() {
        let parsed: WindowSize = serde_json::from_str("7").unwrap();
        assert_eq!(parsed.get(), 7);
        assert!(serde_json::from_str::<WindowSize>("0").is_err());
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "7");
    }

    #[test]
    fn test_plan_edges() {
        assert_eq!(plan(1, w(3), 12), vec![1, 2]);
        assert_eq!(plan(2, w(3), 12), vec![1, 2, 3]);
        assert_eq!(plan(12, w(3), 12), vec![11, 12]);
    }

    #[test]
    fn test_plan_even_window() {
        // Even windows reach one further back than forward.
        assert_eq!(plan(5, w(4), 10), vec![3, 4, 5, 6]);
        assert_eq!(plan(1, w(4), 10), vec![1, 2]);
        assert_eq!(plan(10, w(4), 10), vec![8, 9, 10]);
    }

    #[test]
    fn test_plan_window_of_one() {
        for t in 1..=5 {
            assert_eq!(plan(t, w(1), 5), vec![t]);
        }
    }

    #[test]
    fn test_plan_window_larger_than_sequence() {
        assert_eq!(plan(1, w(50), 3), vec![1, 2, 3]);
        assert_eq!(plan(2, w(50), 3), vec![1, 2, 3]);
        assert_eq!(plan(1, w(7), 1), vec![1]);
    }

    #[test]
    fn test_plan_invariants() {
        for total in 1..=30 {
            for size in 1..=MAX_WINDOW_SIZE {
                let size = w(size);
                for t in 1..=total {
                    let out = plan(t, size, total);
                    assert!(!out.is_empty());
                    assert!(out.len() <= size.get());
                    assert!(out.contains(&t));
                    assert!(out.windows(2).all(|x| x[0] < x[1]));
                    assert!(out.iter().all(|&i| (1..=total).contains(&i)));

                    let fits_before = t > size.offset();
                    let fits_after = t + (size.get() - size.offset() - 1) <= total;
                    if fits_before && fits_after {
                        assert_eq!(out.len(), size.get(), "t={} w={} n={}", t, size, total);
                    }
                }
            }
        }
    }

    #[test]
    fn test_plan_all() {
        let all: Vec<_> = plan_all(w(3), 4).collect();
        assert_eq!(
            all,
            vec![vec![1, 2], vec![1, 2, 3], vec![2, 3, 4], vec![3, 4]]
        );
    }
}
