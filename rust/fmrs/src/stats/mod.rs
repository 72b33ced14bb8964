pub mod classification;
pub mod correlation;
pub mod shift_scan;

pub use classification::{
    classify,
    ClassificationResult,
    Extremum,
    Significance,
    SignificanceReport,
    Thresholds,
};
pub use correlation::{
    pearson,
    pearson_p_value,
    PearsonResult,
};
pub use shift_scan::{
    correlate,
    DegenerateSeries,
    ShiftScan,
};
