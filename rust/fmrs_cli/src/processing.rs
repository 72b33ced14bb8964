use fmrs::{
    run_sliding_window,
    MetaboliteMatrix,
    WindowQuantifier,
    WindowSize,
};
use indicatif::{
    ProgressBar,
    ProgressStyle,
};
use std::time::Instant;
use tracing::info;

/// Runs the sliding-window quantification behind a progress bar.
pub fn quantify_windows<Q: WindowQuantifier>(
    quantifier: &mut Q,
    window_size: WindowSize,
    total: usize,
) -> fmrs::Result<MetaboliteMatrix> {
    let start = Instant::now();
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    let pb = ProgressBar::new(total as u64).with_style(style);

    let res = run_sliding_window(quantifier, window_size, total, |_| pb.inc(1));
    match &res {
        Ok(matrix) => {
            pb.finish();
            info!(
                "Quantified {} windows ({} columns) in {:?}",
                matrix.n_samples(),
                matrix.names().len(),
                start.elapsed()
            );
        }
        Err(_) => pb.abandon(),
    }
    res
}
