//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use erpsync_core::{ExportFormat, ExportResult, Resource};
use erpsync_export::{ExportReport, Preset};
use erpsync_fetch::RepositoryInfo;
use erpsync_store::{ExportHistory, HistoryEntry};
use serde::{Serialize, Serializer};

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for an export job.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOutput<'a> {
    pub repository: &'a str,
    pub branch: &'a str,
    pub format: ExportFormat,
    #[serde(serialize_with = "serialize_datetime")]
    pub started_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_datetime")]
    pub finished_at: DateTime<Utc>,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total_records: usize,
    pub results: &'a [ExportResult],
    /// Commits kept in the session history, newest first.
    pub history: Vec<&'a HistoryEntry>,
}

/// Record count of one resource.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountOutput<'a> {
    pub resource: &'a str,
    pub origin: &'static str,
    /// `null` when the service could not provide a count.
    pub count: Option<u64>,
}

/// A preset entity set.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetOutput {
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
}

/// A writable repository.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryOutput<'a> {
    pub full_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<&'a str>,
    pub private: bool,
}

/// One connection check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutput {
    pub target: String,
    pub ok: bool,
    pub detail: String,
}

impl CheckOutput {
    /// A passing check.
    pub fn ok(target: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ok: true,
            detail: detail.into(),
        }
    }

    /// A failing check.
    pub fn failed(target: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ok: false,
            detail: detail.into(),
        }
    }
}

// ============================================================================
// Serialization helpers
// ============================================================================

fn serialize_datetime<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339())
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats an export report.
    pub fn format_report(
        &self,
        report: &ExportReport,
        history: &ExportHistory,
        repository: &str,
        branch: &str,
    ) -> Result<String> {
        self.format(&ReportOutput {
            repository,
            branch,
            format: report.format,
            started_at: report.started_at,
            finished_at: report.finished_at,
            succeeded: report.succeeded(),
            skipped: report.skipped(),
            failed: report.failed(),
            total_records: report.total_records(),
            results: &report.results,
            history: history.entries().collect(),
        })
    }

    /// Formats record counts.
    pub fn format_counts<'a>(
        &self,
        resources: impl IntoIterator<Item = &'a Resource>,
    ) -> Result<String> {
        let outputs: Vec<CountOutput<'_>> = resources
            .into_iter()
            .map(|r| CountOutput {
                resource: r.name(),
                origin: r.origin.label(),
                count: r.record_count.and_then(|c| c.value()),
            })
            .collect();
        self.format(&outputs)
    }

    /// Formats the preset catalogue.
    pub fn format_presets(&self, presets: &[&Preset]) -> Result<String> {
        let outputs: Vec<PresetOutput> = presets
            .iter()
            .map(|p| PresetOutput {
                name: p.name,
                description: p.description,
                category: p.category,
            })
            .collect();
        self.format(&outputs)
    }

    /// Formats repositories.
    pub fn format_repositories(&self, repos: &[RepositoryInfo]) -> Result<String> {
        let outputs: Vec<RepositoryOutput<'_>> = repos
            .iter()
            .map(|r| RepositoryOutput {
                full_name: &r.full_name,
                default_branch: r.default_branch.as_deref(),
                private: r.private,
            })
            .collect();
        self.format(&outputs)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pretty() {
        let formatter = JsonFormatter::new(true);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_format_compact() {
        let formatter = JsonFormatter::new(false);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_check_output() {
        let check = CheckOutput::failed("GitHub", "no token");
        assert!(!check.ok);
        assert_eq!(check.target, "GitHub");
    }
}
