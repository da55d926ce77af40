//! Destination paths and commit messages.

use chrono::{DateTime, SecondsFormat, Utc};
use erpsync_core::{ExportFormat, ValidationError, sanitize_resource_name, validate_repo_path};

/// ISO-8601 timestamp with `:` and `.` replaced by `-`, safe for file names.
///
/// `2024-05-01T10:20:30.123Z` becomes `2024-05-01T10-20-30-123Z`.
pub fn file_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

/// Builds `{folder}/{resource}_{timestamp}.{ext}`.
///
/// `folder` must already be normalized; `None` writes to the repository root.
pub fn export_path(
    folder: Option<&str>,
    resource: &str,
    at: DateTime<Utc>,
    format: ExportFormat,
) -> Result<String, ValidationError> {
    let name = sanitize_resource_name(resource)?;
    let file = format!("{name}_{}.{}", file_timestamp(at), format.extension());
    let path = match folder {
        Some(folder) => format!("{folder}/{file}"),
        None => file,
    };
    validate_repo_path(&path)?;
    Ok(path)
}

/// Commit message for one exported resource.
pub fn commit_message(resource: &str, record_count: usize, at: DateTime<Utc>) -> String {
    format!(
        "Export {resource}: {record_count} records ({})",
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}
