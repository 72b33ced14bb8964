use tracing::info;

use crate::errors::Result;
use crate::models::{
    smooth,
    trim,
    MetaboliteMatrix,
    ParadigmConfig,
    WindowSize,
};
use crate::stats::{
    classify,
    correlate,
    ShiftScan,
    SignificanceReport,
    Thresholds,
};

/// Parameters of one statistics run.
#[derive(Debug, Clone)]
pub struct StatisticsParams {
    pub paradigm: ParadigmConfig,
    pub window_size: WindowSize,
    pub max_shift: usize,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone)]
pub struct StatisticsOutcome {
    /// Smoothed and trimmed paradigm the metabolites were correlated with.
    pub paradigm: Vec<f64>,
    pub scan: ShiftScan,
    pub report: SignificanceReport,
}

/// Builds and smooths the paradigm, scans every metabolite over
/// `0..max_shift` and classifies the result.
///
/// A paradigm whose length differs from the number of samples in `matrix`
/// is rejected before any correlation is computed.
pub fn run_statistics(
    matrix: &MetaboliteMatrix,
    params: &StatisticsParams,
) -> Result<StatisticsOutcome> {
    let paradigm = params.paradigm.build(matrix.n_samples())?;
    let paradigm = smooth(&paradigm, params.window_size);
    let paradigm = trim(paradigm, params.max_shift)?;
    info!(
        "Correlating {} metabolites against a paradigm of {} samples, {} shifts",
        matrix.n_metabolites(),
        paradigm.len(),
        params.max_shift
    );

    let scan = correlate(&paradigm, matrix, params.max_shift)?;
    if !scan.degenerate.is_empty() {
        info!(
            "{} metabolite/shift pairs had a constant series",
            scan.degenerate.len()
        );
    }
    let report = classify(&scan, &params.thresholds);
    Ok(StatisticsOutcome {
        paradigm,
        scan,
        report,
    })
}
