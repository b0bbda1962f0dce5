//! # File Store Errors
//!
//! One error enum per store, all carrying the path they failed on.

use std::path::PathBuf;

use thiserror::Error;

/// Config document errors. Reads never fail (a bad document is empty);
/// only saving can.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to write config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Item mirror errors.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Mirror I/O failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed mirror file: {0}")]
    Csv(#[from] csv::Error),

    /// A row whose quantity is not a non-negative integer.
    #[error("Invalid row {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
}

/// Local log file errors.
#[derive(Debug, Error)]
pub enum LocalLogError {
    #[error("Log file I/O failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode log row: {0}")]
    Csv(#[from] csv::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
pub type MirrorResult<T> = Result<T, MirrorError>;
pub type LocalLogResult<T> = Result<T, LocalLogError>;
