//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a [`QueryConfig`](crate::QueryConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The content is not valid for its format
    #[error("Failed to parse {format} config: {message}")]
    Parse {
        /// Format name (toml, yaml, json)
        format: &'static str,
        /// Parser diagnostic
        message: String,
    },

    /// The content parsed but holds an unusable value
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// No loader for this file extension (or the format feature is disabled)
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
