//! The two batch pipelines: quantification of sliding windows, and the
//! paradigm correlation of the resulting metabolite table.

mod sliding_window;
mod statistics;

pub use sliding_window::run_sliding_window;
pub use statistics::{
    run_statistics,
    StatisticsOutcome,
    StatisticsParams,
};
