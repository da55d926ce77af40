//! Validation errors shared by every erpsync crate.

use thiserror::Error;

/// An identifier that would end up in a request path was rejected.
///
/// These are raised before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Resource name contains characters outside `[A-Za-z0-9_]`.
    #[error("Invalid resource name: {0:?} (only letters, digits and '_' are allowed)")]
    ResourceName(String),

    /// Base URL did not parse or its host is not allowlisted.
    #[error("Host not allowed: {0}")]
    Host(String),

    /// Repository owner or name contains unsafe characters.
    #[error("Invalid repository identifier: {0:?}")]
    Repository(String),

    /// File path escapes the export folder or contains unsafe characters.
    #[error("Invalid repository path: {0:?}")]
    Path(String),

    /// Branch name contains unsafe characters.
    #[error("Invalid branch name: {0:?}")]
    Branch(String),

    /// Nothing was selected for export.
    #[error("No resources selected")]
    EmptySelection,
}
