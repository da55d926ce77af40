//! Export job and result types.
//!
//! - [`ExportFormat`] - Output format (csv or json)
//! - [`ExportPhase`] - Where a job currently is
//! - [`ExportResult`] - Outcome for one resource
//! - [`PageProgress`] - Pagination progress for one resource

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// Record
// ============================================================================

/// One item returned by the remote collection service.
///
/// The schema is not known ahead of time and is never validated.
pub type Record = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// Export Format
// ============================================================================

/// Output format for exported files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// JSON envelope with metadata and the records under `data`.
    #[default]
    Json,
    /// Delimited text with a header row.
    Csv,
}

impl ExportFormat {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// All formats.
    pub fn all() -> &'static [ExportFormat] {
        &[Self::Json, Self::Csv]
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("Unknown export format: {other} (expected json or csv)")),
        }
    }
}

// ============================================================================
// Export Phase
// ============================================================================

/// Phase of an export job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPhase {
    /// Not started.
    #[default]
    Idle,
    /// Draining pages from the collection service.
    Fetching,
    /// Converting records to the output format.
    Converting,
    /// Writing the file to the repository.
    Committing,
    /// All resources processed.
    Terminal,
}

impl ExportPhase {
    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Fetching => "Fetching",
            Self::Converting => "Converting",
            Self::Committing => "Committing",
            Self::Terminal => "Done",
        }
    }
}

impl fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Page Progress
// ============================================================================

/// Progress after one page has been appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageProgress {
    /// Zero-based index of the page just received.
    pub page_index: usize,
    /// Records accumulated so far, after truncation to any cap.
    pub accumulated: usize,
}

// ============================================================================
// Export Result
// ============================================================================

/// Outcome status for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    /// Records were fetched and committed.
    Success,
    /// The resource had no records; nothing was committed.
    Skipped,
    /// Fetch, convert or commit failed.
    Error,
}

impl ResultStatus {
    /// Returns a short label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Skipped => "skipped",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome for one attempted resource. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    /// Resource name.
    pub resource: String,
    /// Outcome.
    pub status: ResultStatus,
    /// Records fetched (0 for skipped, whatever was known for errors).
    pub record_count: usize,
    /// Repository path written, for successes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Commit SHA, for successes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    /// Human-readable detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExportResult {
    /// Creates a success result.
    pub fn success(
        resource: impl Into<String>,
        record_count: usize,
        path: impl Into<String>,
        commit_sha: Option<String>,
    ) -> Self {
        Self {
            resource: resource.into(),
            status: ResultStatus::Success,
            record_count,
            path: Some(path.into()),
            commit_sha,
            message: None,
        }
    }

    /// Creates a skipped result for an empty resource.
    pub fn skipped(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            status: ResultStatus::Skipped,
            record_count: 0,
            path: None,
            commit_sha: None,
            message: Some(message.into()),
        }
    }

    /// Creates an error result.
    pub fn error(
        resource: impl Into<String>,
        record_count: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            resource: resource.into(),
            status: ResultStatus::Error,
            record_count,
            path: None,
            commit_sha: None,
            message: Some(message.into()),
        }
    }

    /// Returns true for success results.
    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }

    /// Returns true for error results.
    pub fn is_error(&self) -> bool {
        self.status == ResultStatus::Error
    }
}

// ============================================================================
// Tests
// ============================================================================
