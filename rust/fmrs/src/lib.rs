pub mod data_sources;
pub mod errors;
pub mod files;
pub mod models;
pub mod pipeline;
pub mod stats;
pub mod traits;

pub use errors::{
    FmrsError,
    Result,
};
pub use models::{
    MetaboliteMatrix,
    ParadigmConfig,
    WindowSize,
};
pub use pipeline::{
    run_sliding_window,
    run_statistics,
};
pub use stats::{
    SignificanceReport,
    Thresholds,
};
pub use traits::WindowQuantifier;
