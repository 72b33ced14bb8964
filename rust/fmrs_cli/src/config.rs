use fmrs::data_sources::TarquinConfig;
use fmrs::{
    ParadigmConfig,
    Thresholds,
    WindowSize,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::path::{
    Path,
    PathBuf,
};
use tracing::debug;

use crate::error::CliError;

pub const TEMPLATE_FILE_NAME: &str = "fmrs_config_template.json";

/// Settings of a run. Every section may be left out of the file, command
/// line arguments take precedence over it.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub paradigm: ParadigmConfig,
    pub thresholds: Thresholds,
    pub tarquin: TarquinConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub window_size: Option<WindowSize>,
    pub max_shift: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: None,
            max_shift: 60,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: Option<PathBuf>,
}

impl Config {
    /// Reads the file if one is given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|e| fmrs::FmrsError::io(e, path))?;
        let config: Config = serde_json::from_str(&text)?;
        debug!("Loaded configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn with_window(mut self, window: Option<usize>) -> Result<Self, CliError> {
        if let Some(w) = window {
            self.analysis.window_size = Some(WindowSize::new(w)?);
        }
        Ok(self)
    }

    pub fn with_outdir(mut self, outdir: Option<&PathBuf>) -> Self {
        if let Some(dir) = outdir {
            self.output.directory = Some(dir.clone());
        }
        self
    }

    pub fn with_max_shift(mut self, max_shift: Option<usize>) -> Result<Self, CliError> {
        if let Some(shift) = max_shift {
            if shift == 0 {
                return Err(CliError::Config(
                    "maximum shift must be at least 1".to_string(),
                ));
            }
            self.analysis.max_shift = shift;
        }
        Ok(self)
    }

    pub fn with_tarquin(mut self, binary: Option<&PathBuf>) -> Self {
        if let Some(binary) = binary {
            self.tarquin.binary = binary.clone();
        }
        self
    }

    /// Output directory, the current working directory unless configured.
    pub fn output_directory(&self) -> Result<PathBuf, CliError> {
        match &self.output.directory {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    pub fn template() -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&Config::default())?)
    }
}
