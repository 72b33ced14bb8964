use serde::{
    Deserialize,
    Serialize,
};
use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};
use std::process::Command;
use tempfile::TempDir;
use tracing::{
    debug,
    error,
};

use super::spectro::SpectroInput;
use crate::errors::{
    FmrsError,
    Result,
};
use crate::files::parse_quantification_csv;
use crate::models::QuantifiedRow;
use crate::traits::WindowQuantifier;

const AV_LIST_NAME: &str = "avlist.csv";
const FIT_OUTPUT_NAME: &str = "tarquin_fMRS_fit.csv";

/// How TARQUIN is invoked for every window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TarquinConfig {
    /// Path of the TARQUIN executable.
    pub binary: PathBuf,
    /// Fitting options passed verbatim after the input/output options.
    pub fit_args: Vec<String>,
}

impl Default for TarquinConfig {
    fn default() -> Self {
        let fit_args = [
            "--ref",
            "4.66",
            "--max_metab_shift",
            "0.015",
            "--auto_phase",
            "true",
            "--dyn_freq_corr",
            "true",
            "--start_pnt",
            "20",
            "--ref_signals",
            "1h_naa",
            "--dref_signals",
            "1h_naa",
            "--pul_seq",
            "press",
            "--int_basis",
            "1h_brain",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        Self {
            binary: PathBuf::from(if cfg!(windows) {
                "tarquin.exe"
            } else {
                "tarquin"
            }),
            fit_args,
        }
    }
}

/// [`WindowQuantifier`] backed by the TARQUIN command line program.
///
/// Every call writes the window's acquisition list to a private temporary
/// directory, runs TARQUIN on the full input with that average list and reads
/// back the single result row. The directory is removed on drop.
pub struct TarquinQuantifier {
    config: TarquinConfig,
    input: PathBuf,
    format: &'static str,
    workdir: TempDir,
}

impl TarquinQuantifier {
    pub fn new(config: TarquinConfig, input: &SpectroInput, tmp_parent: &Path) -> Result<Self> {
        let workdir = tempfile::Builder::new()
            .prefix(".fmrs_temp")
            .tempdir_in(tmp_parent)
            .map_err(|e| FmrsError::io(e, tmp_parent))?;
        debug!("Using temporary directory {}", workdir.path().display());
        Ok(Self {
            config,
            input: input.path.clone(),
            format: input.tarquin_format(),
            workdir,
        })
    }

    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    fn write_av_list(&self, window: &[usize]) -> Result<PathBuf> {
        let path = self.workdir.path().join(AV_LIST_NAME);
        let mut file = std::fs::File::create(&path).map_err(|e| FmrsError::io(e, &path))?;
        for index in window {
            writeln!(file, "{}", index).map_err(|e| FmrsError::io(e, &path))?;
        }
        Ok(path)
    }

    fn command(&self, av_list: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.config.binary);
        cmd.arg("--input")
            .arg(&self.input)
            .arg("--format")
            .arg(self.format)
            .arg("--av_list")
            .arg(av_list)
            .arg("--output_csv")
            .arg(output)
            .args(&self.config.fit_args);
        cmd
    }
}

impl WindowQuantifier for TarquinQuantifier {
    fn quantify(&mut self, window: &[usize]) -> Result<QuantifiedRow> {
        let av_list = self.write_av_list(window)?;
        let output = self.workdir.path().join(FIT_OUTPUT_NAME);
        if output.exists() {
            std::fs::remove_file(&output).map_err(|e| FmrsError::io(e, &output))?;
        }

        let program = self.config.binary.display().to_string();
        let mut cmd = self.command(&av_list, &output);
        debug!("Running {:?}", cmd);
        let out = cmd.output().map_err(|e| FmrsError::ExternalTool {
            program: program.clone(),
            status: None,
            context: format!("could not be started: {}", e),
        })?;
        debug!("stdout: {}", String::from_utf8_lossy(&out.stdout));
        debug!("stderr: {}", String::from_utf8_lossy(&out.stderr));

        if !out.status.success() {
            error!(
                "{} failed on window {:?}, run with RUST_LOG=debug for its output",
                program, window
            );
            return Err(FmrsError::ExternalTool {
                program,
                status: out.status.code(),
                context: format!("window {:?}", window),
            });
        }

        let text = std::fs::read_to_string(&output).map_err(|e| FmrsError::io(e, &output))?;
        parse_quantification_csv(&text)
            .map_err(|e| e.append_to_context(&format!(" (TARQUIN output {})", output.display())))
    }
}
