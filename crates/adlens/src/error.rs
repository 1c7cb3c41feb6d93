//! Error types for the adlens library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for adlens operations.
///
/// Only the parse-class variants (`Io`, `Csv`, `EmptyData`) are ever shown to
/// the caller as input problems. `Generation` is always absorbed by the
/// insight engine's fallback path. `Precondition` and `Contract` signal
/// internal defects, not bad input.
#[derive(Debug, Error)]
pub enum AdlensError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library (includes inconsistent column counts).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty input or no header to parse.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generation backend unreachable, unauthorized, timed out, or returned
    /// output that failed structured parsing.
    #[error("Generation error: {0}")]
    Generation(String),

    /// Metrics engine received a table that did not pass validation.
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// The assembled report broke the output contract.
    #[error("Report contract violated: {0}")]
    Contract(String),
}

/// Result type alias for adlens operations.
pub type Result<T> = std::result::Result<T, AdlensError>;
