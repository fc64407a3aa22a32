//! Error type for the analysis core.

use thiserror::Error;

/// Result alias used across the core.
pub type Result<T> = std::result::Result<T, WeaverError>;

/// Errors surfaced to callers.
///
/// Malformed stored documents are not errors: loaders recover them locally
/// with empty defaults.
#[derive(Debug, Error)]
pub enum WeaverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Store error for key '{key}': {message}")]
    Store { key: String, message: String },
}

impl WeaverError {
    /// Create a store error for a key.
    pub fn store(key: impl Into<String>, message: impl Into<String>) -> Self {
        WeaverError::Store {
            key: key.into(),
            message: message.into(),
        }
    }
}
