//! CLI error types

use numeric_core::types::NumericError;
use thiserror::Error;

/// Errors surfaced by the `numerica` binary
#[derive(Debug, Error)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot read {field}: {message} (expected e.g. \"{example}\")")]
    InputFormat {
        field: &'static str,
        message: String,
        example: &'static str,
    },

    #[error("{method} did not succeed: {reason}")]
    MethodFailed { method: String, reason: String },

    #[error(transparent)]
    Numeric(#[from] NumericError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
