use std::fmt::Display;
use std::path::PathBuf;

#[derive(Debug)]
pub enum FmrsError {
    /// The requested analysis cannot be set up (window size out of range,
    /// paradigm not matching the acquisition count, ...).
    Configuration {
        msg: String,
    },
    DimensionMismatch {
        expected: usize,
        found: usize,
        context: String,
    },
    /// The external fitting program failed, fatal for the whole run.
    ExternalTool {
        program: String,
        status: Option<i32>,
        context: String,
    },
    InputFormat {
        msg: String,
        path: Option<PathBuf>,
    },
    Io {
        source: std::io::Error,
        path: Option<PathBuf>,
    },
    Csv(csv::Error),
    ParseError {
        msg: String,
    },
}

impl FmrsError {
    pub fn configuration(msg: impl Display) -> Self {
        Self::Configuration {
            msg: msg.to_string(),
        }
    }

    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: Some(path.into()),
        }
    }

    pub fn append_to_context(mut self, extra: &str) -> Self {
        match &mut self {
            FmrsError::DimensionMismatch { context, .. }
            | FmrsError::ExternalTool { context, .. } => {
                context.push_str(extra);
            }
            FmrsError::Configuration { msg }
            | FmrsError::InputFormat { msg, .. }
            | FmrsError::ParseError { msg } => {
                msg.push_str(extra);
            }
            FmrsError::Io { .. } | FmrsError::Csv(_) => {}
        }
        self
    }
}

impl Display for FmrsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FmrsError::Configuration { msg } => write!(f, "Configuration error: {}", msg),
            FmrsError::DimensionMismatch {
                expected,
                found,
                context,
            } => write!(
                f,
                "Dimension mismatch (expected {}, found {}): {}",
                expected, found, context
            ),
            FmrsError::ExternalTool {
                program,
                status,
                context,
            } => match status {
                Some(code) => write!(
                    f,
                    "External program \"{}\" exited with status {}: {}",
                    program, code, context
                ),
                None => write!(f, "External program \"{}\" failed: {}", program, context),
            },
            FmrsError::InputFormat { msg, path } => match path {
                Some(path) => write!(f, "Unsupported input {}: {}", path.display(), msg),
                None => write!(f, "Unsupported input: {}", msg),
            },
            FmrsError::Io { source, path } => match path {
                Some(path) => write!(f, "Error accessing file {}: {}", path.display(), source),
                None => write!(f, "I/O error: {}", source),
            },
            FmrsError::Csv(e) => write!(f, "Error reading CSV data: {}", e),
            FmrsError::ParseError { msg } => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for FmrsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FmrsError::Io { source, .. } => Some(source),
            FmrsError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FmrsError>;

impl From<std::io::Error> for FmrsError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source, path: None }
    }
}

impl From<csv::Error> for FmrsError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<std::num::ParseIntError> for FmrsError {
    fn from(x: std::num::ParseIntError) -> Self {
        Self::ParseError { msg: x.to_string() }
    }
}

impl From<serde_json::Error> for FmrsError {
    fn from(val: serde_json::Error) -> Self {
        FmrsError::ParseError {
            msg: val.to_string(),
        }
    }
}
