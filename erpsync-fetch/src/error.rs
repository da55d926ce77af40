//! Fetch error types.

use erpsync_core::ValidationError;
use reqwest::StatusCode;
use thiserror::Error;

use crate::host::http::HttpResponse;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for calls against either remote API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// An identifier was rejected before any request was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// The token was rejected (401).
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// The identity lacks permission (403, or no push access).
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The remote reported the target does not exist (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the remote.
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after: Option<u64>,
    },

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// Status code.
        status: u16,
        /// Message extracted from the body, or the canonical reason.
        message: String,
    },

    /// The body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Token acquisition failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl FetchError {
    /// Maps a non-success response to a typed error.
    ///
    /// `context` names the thing that was requested and is used for 404s.
    pub fn from_response(response: &HttpResponse, context: &str) -> Self {
        let message = response
            .error_message()
            .unwrap_or_else(|| canonical_reason(response.status));

        match response.status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN if response.rate_limit_exhausted() => Self::RateLimited {
                retry_after: response.retry_after_secs(),
            },
            StatusCode::FORBIDDEN => Self::AccessDenied(message),
            StatusCode::NOT_FOUND => Self::NotFound(context.to_string()),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited {
                retry_after: response.retry_after_secs(),
            },
            status => Self::Status {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Returns true if this error was raised before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true for 404 errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

fn canonical_reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| status.as_u16().to_string(), str::to_string)
}

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A header value could not be encoded.
    #[error("Invalid header value for {0}")]
    InvalidHeader(String),

    /// Request body could not be serialized.
    #[error("Body serialization failed: {0}")]
    Body(#[from] serde_json::Error),
}

// ============================================================================
// Auth Error
// ============================================================================

/// Error type for token acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No cached session; the interactive flow is needed.
    #[error("Sign-in required for {0}")]
    InteractionRequired(String),

    /// The user dismissed the interactive prompt.
    #[error("Sign-in cancelled for {0}")]
    Cancelled(String),

    /// The flow failed for another reason.
    #[error("Token acquisition failed: {0}")]
    Failed(String),
}
