//! Storage error types.

use thiserror::Error;

/// Errors from the upload storage service.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Provider configuration is invalid.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// The object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),

    /// Underlying I/O failure.
    #[error("storage i/o error: {0}")]
    Io(String),
}

impl StorageError {
    pub(super) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
