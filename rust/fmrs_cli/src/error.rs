use fmrs::FmrsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Fmrs(#[from] FmrsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Problem opening logfile {path}: {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Usage error: {0}")]
    Usage(String),
}

impl CliError {
    /// Process exit code: 1 for data and I/O errors, 2 for usage and
    /// configuration errors, 3 when the external fitting program failed.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Fmrs(FmrsError::Configuration { .. }) => 2,
            CliError::Fmrs(FmrsError::ExternalTool { .. }) => 3,
            CliError::Fmrs(_) | CliError::Io(_) => 1,
            CliError::Json(_) | CliError::LogFile { .. } | CliError::Config(_) | CliError::Usage(_) => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::from(FmrsError::configuration("window")).exit_code(),
            2
        );
        let tool = FmrsError::ExternalTool {
            program: "tarquin".to_string(),
            status: Some(1),
            context: String::new(),
        };
        assert_eq!(CliError::from(tool).exit_code(), 3);
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(CliError::from(FmrsError::io(missing, "a.csv")).exit_code(), 1);
        assert_eq!(CliError::Usage("no window".into()).exit_code(), 2);
    }
}
