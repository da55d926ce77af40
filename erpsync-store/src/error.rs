//! Store error types.

use erpsync_core::ValidationError;
use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A value failed identifier validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// `config set` was given a key that does not exist.
    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    /// `config set` was given a value that does not parse.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// Setting key.
        key: String,
        /// What was wrong.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Builds an [`StoreError::InvalidValue`].
    pub fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Returns true if the error came from the filesystem.
    pub fn is_io(&self) -> bool {
        matches!(self, StoreError::Io(_))
    }
}
