//! Export error types.

use erpsync_core::ValidationError;
use erpsync_fetch::FetchError;
use thiserror::Error;

/// Errors that stop an export job before it starts, or fail one resource.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The job was rejected before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A remote call failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Records could not be converted.
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

impl ExportError {
    /// Returns true if the job was rejected up front.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
            || matches!(self, Self::Fetch(e) if e.is_validation())
    }
}

/// Errors from the format converter.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Delimited-text writer failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The writer produced bytes that are not UTF-8.
    #[error("Output is not valid UTF-8")]
    Encoding,
}
