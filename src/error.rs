//! Error types for covmerge

use thiserror::Error;

/// Result type alias for covmerge operations
pub type Result<T> = std::result::Result<T, CovmergeError>;

/// Error types for covmerge operations
///
/// Missing or corrupt resultset files are not errors; the read side maps them
/// to empty values. Only failures that would lose a coverage result or block a
/// user request end up here.
#[derive(Error, Debug)]
pub enum CovmergeError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A resultset could not be written
    #[error("Cannot store resultset '{path}': {reason}")]
    StoreFailed { path: String, reason: String },

    /// Input handed to `store` is not a coverage map
    #[error("Invalid coverage data in '{path}': {reason}")]
    InvalidCoverage { path: String, reason: String },

    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A snapshot or report could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Resultset files could not be removed
    #[error("Clear error: {0}")]
    ClearFailed(String),
}
