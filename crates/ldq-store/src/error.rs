//! Store errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading data into a [`MemoryStore`](crate::MemoryStore)
#[derive(Debug, Error)]
pub enum StoreError {
    /// A fixture line is not a valid statement
    #[error("Fixture line {line}: {message}")]
    Fixture { line: usize, message: String },

    /// The fixture file could not be read
    #[error("Failed to read fixture {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
