use fmrs::data_sources::{
    SpectroInput,
    TarquinQuantifier,
};
use fmrs::files::{
    input_stem,
    output_path,
    output_paths,
    read_metabolite_csv_file,
    title_line,
    write_metabolite_csv,
    write_outputs,
    write_shift_matrix,
    MatrixKind,
    CORRELATIONS_SUFFIX,
    P_VALUES_SUFFIX,
};
use fmrs::pipeline::StatisticsParams;
use fmrs::{
    run_statistics,
    WindowSize,
};
use std::path::PathBuf;
use tracing::{
    info,
    instrument,
};

use crate::cleanup::CleanupRegistry;
use crate::cli::{
    SlidingWindowArgs,
    StatisticsArgs,
    WriteTemplateArgs,
};
use crate::config::{
    Config,
    TEMPLATE_FILE_NAME,
};
use crate::error::CliError;
use crate::processing::quantify_windows;
use crate::prompt::prompt_window_size;

pub const PROGRAM_NAME: &str = "fmrs";
pub const PROGRAM_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log target of the final significance report, kept off the console log
/// since the report is printed to stdout.
pub const REPORT_TARGET: &str = "fmrs::report";

/// Per-run state shared by the subcommands.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: Config,
    pub outdir: PathBuf,
    pub run_id: u32,
    /// Work directories removed on interrupt.
    pub cleanup: CleanupRegistry,
}

impl RunContext {
    /// Suffix used when an output file of the same name already exists.
    pub fn collision_tag(&self) -> String {
        format!(
            "{}{}",
            chrono::Local::now().format("%Y%m%d%H%M%S"),
            self.run_id
        )
    }

    fn window_size(&self) -> Result<WindowSize, CliError> {
        match self.config.analysis.window_size {
            Some(w) => Ok(w),
            None => prompt_window_size(std::io::stdin().lock(), std::io::stdout()),
        }
    }

    fn title(&self) -> String {
        title_line(PROGRAM_NAME, PROGRAM_VERSION)
    }
}

/// Main function for the 'sliding-window' subcommand.
#[instrument(skip_all)]
pub fn main_sliding_window(args: SlidingWindowArgs, ctx: &RunContext) -> Result<(), CliError> {
    let input = SpectroInput::open(&args.spec)?;
    let total = input.acquisition_count(args.acquisitions)?;
    let window = ctx.window_size()?;
    info!(
        "Sliding window {} over {} acquisitions of {}",
        window,
        total,
        input.path.display()
    );

    let matrix = {
        let mut quantifier = TarquinQuantifier::new(ctx.config.tarquin.clone(), &input, &ctx.outdir)?;
        let _tracked = ctx.cleanup.track(quantifier.workdir());
        quantify_windows(&mut quantifier, window, total)?
    };

    let mut buf = Vec::new();
    write_metabolite_csv(&mut buf, &ctx.title(), &matrix)?;
    let stem = input_stem(&args.spec)?;
    let out = output_path(&ctx.outdir, &stem, "", || ctx.collision_tag());
    write_outputs(&[(out.as_path(), buf.as_slice())])?;
    info!("Wrote metabolite table to {}", out.display());
    println!("{}", out.display());
    Ok(())
}

/// Main function for the 'statistics' subcommand.
#[instrument(skip_all)]
pub fn main_statistics(args: StatisticsArgs, ctx: &RunContext) -> Result<(), CliError> {
    let table = read_metabolite_csv_file(&args.csv)?;
    info!(
        "Read {} samples of {} metabolites from {} ({})",
        table.matrix.n_samples(),
        table.matrix.n_metabolites(),
        args.csv.display(),
        table.title
    );
    let params = StatisticsParams {
        paradigm: ctx.config.paradigm.clone(),
        window_size: ctx.window_size()?,
        max_shift: ctx.config.analysis.max_shift,
        thresholds: ctx.config.thresholds,
    };
    let outcome = run_statistics(&table.matrix, &params)?;

    // Render both matrices before touching the disk.
    let names = &outcome.scan.metabolite_names;
    let mut corr_buf = Vec::new();
    write_shift_matrix(
        &mut corr_buf,
        &ctx.title(),
        names,
        &outcome.scan.correlation,
        MatrixKind::Correlation,
    )?;
    let mut p_buf = Vec::new();
    write_shift_matrix(
        &mut p_buf,
        &ctx.title(),
        names,
        &outcome.scan.p_value,
        MatrixKind::PValue,
    )?;

    let stem = input_stem(&args.csv)?;
    let [corr_path, p_path] = output_paths(
        &ctx.outdir,
        &stem,
        [CORRELATIONS_SUFFIX, P_VALUES_SUFFIX],
        || ctx.collision_tag(),
    );
    write_outputs(&[
        (corr_path.as_path(), corr_buf.as_slice()),
        (p_path.as_path(), p_buf.as_slice()),
    ])?;
    info!(
        "Wrote correlations to {} and p-values to {}",
        corr_path.display(),
        p_path.display()
    );

    for line in outcome.report.to_string().lines() {
        info!(target: REPORT_TARGET, "{}", line);
        println!("{}", line);
    }
    Ok(())
}

/// Main function for the 'write-template' subcommand.
pub fn main_write_template(args: WriteTemplateArgs) -> Result<(), CliError> {
    std::fs::create_dir_all(&args.outdir)?;
    let path = args.outdir.join(TEMPLATE_FILE_NAME);
    std::fs::write(&path, Config::template()?)?;
    println!("Wrote configuration template to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmrs::files::{
        read_shift_matrix,
        write_metabolite_csv,
    };
    use fmrs::models::{
        Array2D,
        MetaboliteMatrix,
    };
    use fmrs::ParadigmConfig;

    fn write_table(path: &std::path::Path, n: usize) {
        let paradigm = ParadigmConfig::default().build(360).unwrap();
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|t| vec![1.0, 1.0, 1.0, 5.0 + paradigm[t % 360], (t % 7) as f64])
            .collect();
        let names = ["Row", "Col", "Slice", "NAA", "Cr"].map(String::from).to_vec();
        let matrix = MetaboliteMatrix::new(names, Array2D::new(rows).unwrap()).unwrap();
        let mut buf = Vec::new();
        write_metabolite_csv(&mut buf, "fmrs 0.1.0 Results:", &matrix).unwrap();
        std::fs::write(path, buf).unwrap();
    }

    fn context(outdir: &std::path::Path) -> RunContext {
        let config = Config::default()
            .with_window(Some(1))
            .unwrap()
            .with_outdir(Some(&outdir.to_path_buf()));
        RunContext {
            config,
            outdir: outdir.to_path_buf(),
            run_id: 123,
            cleanup: CleanupRegistry::default(),
        }
    }

    #[test]
    fn test_statistics_writes_both_matrices() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("run1.csv");
        write_table(&csv, 360);
        let ctx = context(dir.path());
        let args = StatisticsArgs {
            csv: csv.clone(),
            window: Some(1),
            outdir: None,
            config: None,
            max_shift: None,
        };
        main_statistics(args.clone(), &ctx).unwrap();

        let corr_path = dir.path().join("run1_correlations.csv");
        let text = std::fs::read_to_string(&corr_path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(ctx.title().as_str()));
        assert_eq!(lines.next(), Some("NAA,Cr"));
        assert!(lines.next().unwrap().starts_with("1.000000,"));
        assert_eq!(text.lines().count(), 2 + 60);

        let (_, names, p) =
            read_shift_matrix(std::fs::read(dir.path().join("run1_pvalues.csv")).unwrap().as_slice())
                .unwrap();
        assert_eq!(names, vec!["NAA", "Cr"]);
        assert!(p.get(0, 0).unwrap() < 1e-12);

        // A second run must not overwrite the first.
        main_statistics(args, &ctx).unwrap();
        let tagged: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|n| n.starts_with("run1_correlations_") && n.ends_with("123.csv"))
            .collect();
        assert_eq!(tagged.len(), 1);
    }

    #[test]
    fn test_statistics_outputs_share_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("run2.csv");
        write_table(&csv, 360);
        std::fs::write(dir.path().join("run2_pvalues.csv"), "older run").unwrap();
        let ctx = context(dir.path());
        let args = StatisticsArgs {
            csv,
            window: Some(1),
            outdir: None,
            config: None,
            max_shift: None,
        };
        main_statistics(args, &ctx).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert!(!names.contains(&"run2_correlations.csv".to_string()), "{:?}", names);
        let corr_tag = names
            .iter()
            .find_map(|n| n.strip_prefix("run2_correlations_"))
            .unwrap();
        let p_tag = names
            .iter()
            .find_map(|n| n.strip_prefix("run2_pvalues_"))
            .unwrap();
        assert_eq!(corr_tag, p_tag);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("run2_pvalues.csv")).unwrap(),
            "older run"
        );
    }

    #[test]
    fn test_statistics_length_mismatch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("short.csv");
        write_table(&csv, 200);
        let ctx = context(dir.path());
        let args = StatisticsArgs {
            csv,
            window: Some(1),
            outdir: None,
            config: None,
            max_shift: None,
        };
        let err = main_statistics(args, &ctx).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(!dir.path().join("short_correlations.csv").exists());
        assert!(!dir.path().join("short_pvalues.csv").exists());
    }

    #[test]
    fn test_write_template_is_loadable() {
        let dir = tempfile::tempdir().unwrap();
        main_write_template(WriteTemplateArgs {
            outdir: dir.path().join("templates"),
        })
        .unwrap();
        let path = dir.path().join("templates").join(TEMPLATE_FILE_NAME);
        assert_eq!(Config::load(Some(&path)).unwrap(), Config::default());
    }

    #[test]
    fn test_collision_tag_format() {
        let dir = tempfile::tempdir().unwrap();
        let tag = context(dir.path()).collision_tag();
        assert_eq!(tag.len(), 14 + 3);
        assert!(tag.ends_with("123"));
        assert!(tag.chars().all(|c| c.is_ascii_digit()));
    }
}
