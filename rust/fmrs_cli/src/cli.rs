use clap::{
    Parser,
    Subcommand,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fmrs", author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Quantify every sliding window of a dynamic spectroscopy series with TARQUIN.
    SlidingWindow(SlidingWindowArgs),
    /// Correlate a metabolite table with the stimulus paradigm.
    Statistics(StatisticsArgs),
    /// Write a configuration template with the default settings.
    WriteTemplate(WriteTemplateArgs),
}

impl Commands {
    pub fn outdir(&self) -> Option<&PathBuf> {
        match self {
            Commands::SlidingWindow(args) => args.outdir.as_ref(),
            Commands::Statistics(args) => args.outdir.as_ref(),
            Commands::WriteTemplate(args) => Some(&args.outdir),
        }
    }

    pub fn config(&self) -> Option<&PathBuf> {
        match self {
            Commands::SlidingWindow(args) => args.config.as_ref(),
            Commands::Statistics(args) => args.config.as_ref(),
            Commands::WriteTemplate(_) => None,
        }
    }

    pub fn window(&self) -> Option<usize> {
        match self {
            Commands::SlidingWindow(args) => args.window,
            Commands::Statistics(args) => args.window,
            Commands::WriteTemplate(_) => None,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct SlidingWindowArgs {
    /// DICOM file or either half of a SPAR/SDAT pair.
    #[arg(short, long)]
    pub spec: PathBuf,

    /// Number of spectra averaged per window (1-50), prompted for if missing.
    #[arg(short, long)]
    pub window: Option<usize>,

    /// Output directory, defaults to the current working directory.
    #[arg(short, long)]
    pub outdir: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path of the TARQUIN executable.
    #[arg(long)]
    pub tarquin: Option<PathBuf>,

    /// Number of dynamics, overrides the value read from the header.
    #[arg(short = 'n', long)]
    pub acquisitions: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
pub struct StatisticsArgs {
    /// Metabolite table written by `sliding-window`.
    #[arg(long)]
    pub csv: PathBuf,

    /// Window the table was averaged with (1-50), prompted for if missing.
    #[arg(short, long)]
    pub window: Option<usize>,

    /// Output directory, defaults to the current working directory.
    #[arg(short, long)]
    pub outdir: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of shifts to scan.
    #[arg(short, long)]
    pub max_shift: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
pub struct WriteTemplateArgs {
    /// Directory the template is written to.
    #[arg(short, long)]
    pub outdir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_statistics() {
        let args = Args::try_parse_from([
            "fmrs",
            "statistics",
            "--csv",
            "run1.csv",
            "--window",
            "5",
            "--max-shift",
            "40",
        ])
        .unwrap();
        let Some(Commands::Statistics(stats)) = args.command else {
            panic!("expected statistics subcommand");
        };
        assert_eq!(stats.csv, PathBuf::from("run1.csv"));
        assert_eq!(stats.window, Some(5));
        assert_eq!(stats.max_shift, Some(40));
        assert!(stats.outdir.is_none());
    }

    #[test]
    fn test_spec_is_required() {
        assert!(Args::try_parse_from(["fmrs", "sliding-window", "--window", "3"]).is_err());
    }
}
