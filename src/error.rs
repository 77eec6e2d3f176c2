//! Error types for manifest loading

use thiserror::Error;

use crate::reader::ReadError;

/// Result type for manifest operations
pub type Result<T> = std::result::Result<T, ManifestError>;

/// Failures outside the rule engine. Rule violations are never errors;
/// they are reported as diagnostics.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
