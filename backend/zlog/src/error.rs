use std::io;
use std::path::PathBuf;

/// Errors surfaced while building a logger or loading its config.
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("cannot create log file: {}", path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot open log file: {}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read config file: {}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse logger config")]
    ParseConfig(#[from] serde_yaml::Error),

    #[error("invalid value {value:?} for env var {var}")]
    InvalidEnv { var: String, value: String },
}

pub type Result<T> = std::result::Result<T, LoggerError>;
