//! Export orchestrator.
//!
//! Runs one export job: for each selected resource, in order, fetch every
//! page, convert, and commit. A failure is recorded against its resource
//! and the job moves on to the next one.

use chrono::{DateTime, Utc};
use erpsync_core::{
    ExportFormat, ExportPhase, ExportResult, PageProgress, RecordCount, ResultStatus,
    ValidationError, normalize_folder, sanitize_resource_name,
};
use erpsync_store::{ExportHistory, HistoryEntry, ResourceSet};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::convert::convert;
use crate::error::ExportError;
use crate::observer::ExportObserver;
use crate::path::{commit_message, export_path};
use crate::sources::{FileStore, RecordSource};

/// Message attached to skipped results.
const EMPTY_MESSAGE: &str = "No records";

// ============================================================================
// Export Job
// ============================================================================

/// What to export and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    /// Resource names, processed in this order.
    pub resources: Vec<String>,
    /// Output format.
    pub format: ExportFormat,
    /// Per-resource record cap. `None` or `0` means no cap.
    pub max_records: Option<usize>,
    /// Folder inside the repository. Empty means the root.
    pub folder: String,
}

impl ExportJob {
    /// Creates a job with no cap, writing to the repository root.
    pub fn new<I, S>(resources: I, format: ExportFormat) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            resources: resources.into_iter().map(Into::into).collect(),
            format,
            max_records: None,
            folder: String::new(),
        }
    }

    /// Sets the record cap.
    pub fn with_max_records(mut self, max: Option<usize>) -> Self {
        self.max_records = max;
        self
    }

    /// Sets the destination folder.
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    /// Checks the whole job before anything runs.
    ///
    /// Returns the sanitized names and the normalized folder.
    pub fn validate(&self) -> Result<(Vec<String>, Option<String>), ValidationError> {
        if self.resources.is_empty() {
            return Err(ValidationError::EmptySelection);
        }
        let names = self
            .resources
            .iter()
            .map(|r| sanitize_resource_name(r))
            .collect::<Result<Vec<_>, _>>()?;
        let folder = normalize_folder(&self.folder)?;
        Ok((names, folder))
    }
}

// ============================================================================
// Export Report
// ============================================================================

/// Aggregate outcome of one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    /// One result per resource, in job order.
    pub results: Vec<ExportResult>,
    /// Output format used.
    pub format: ExportFormat,
    /// When the job started.
    pub started_at: DateTime<Utc>,
    /// When the last resource finished.
    pub finished_at: DateTime<Utc>,
}

impl ExportReport {
    /// Number of committed resources.
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    /// Number of failed resources.
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_error()).count()
    }

    /// Number of empty resources.
    pub fn skipped(&self) -> usize {
        self.results.len() - self.succeeded() - self.failed()
    }

    /// Returns true if at least one resource failed.
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Records committed across all resources.
    pub fn total_records(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.is_success())
            .map(|r| r.record_count)
            .sum()
    }
}

// ============================================================================
// Exporter
// ============================================================================

/// Drives export jobs against a record source and a file store.
pub struct Exporter<'a> {
    source: &'a dyn RecordSource,
    store: &'a dyn FileStore,
    clock: fn() -> DateTime<Utc>,
}

impl<'a> Exporter<'a> {
    /// Creates an exporter using the system clock.
    pub fn new(source: &'a dyn RecordSource, store: &'a dyn FileStore) -> Self {
        Self {
            source,
            store,
            clock: Utc::now,
        }
    }

    /// Replaces the clock used for file timestamps.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Runs a job to completion.
    ///
    /// Only validation stops the job, and it does so before the first
    /// request. Every other failure becomes an error result for its
    /// resource. Each commit is recorded in `history`.
    #[instrument(skip_all, fields(resources = job.resources.len(), format = %job.format))]
    pub async fn run(
        &self,
        job: &ExportJob,
        history: &mut ExportHistory,
        observer: &mut dyn ExportObserver,
    ) -> Result<ExportReport, ExportError> {
        let (names, folder) = job.validate()?;
        let max_records = job.max_records.filter(|m| *m > 0);
        let started_at = (self.clock)();
        let total = names.len();

        info!(total, "Export started");
        let mut results = Vec::with_capacity(total);

        for (index, name) in names.iter().enumerate() {
            observer.on_resource_start(index, total, name);

            let result = self
                .export_one(name, job.format, max_records, folder.as_deref(), history, observer)
                .await;

            if result.status == ResultStatus::Error {
                warn!(resource = %name, message = ?result.message, "Resource failed");
            } else {
                debug!(resource = %name, status = %result.status, "Resource finished");
            }

            observer.on_resource_complete(index, &result);
            results.push(result);
        }

        let report = ExportReport {
            results,
            format: job.format,
            started_at,
            finished_at: (self.clock)(),
        };

        info!(
            succeeded = report.succeeded(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Export finished"
        );
        observer.on_finished(&report);
        Ok(report)
    }

    async fn export_one(
        &self,
        name: &str,
        format: ExportFormat,
        max_records: Option<usize>,
        folder: Option<&str>,
        history: &mut ExportHistory,
        observer: &mut dyn ExportObserver,
    ) -> ExportResult {
        // Fetching
        observer.on_phase(name, ExportPhase::Fetching);
        let mut accumulated = 0;
        let fetched = {
            let mut on_page = |progress: PageProgress| {
                accumulated = progress.accumulated;
                observer.on_page(name, progress);
            };
            self.source
                .fetch_records(name, max_records, &mut on_page)
                .await
        };
        let records = match fetched {
            Ok(records) => records,
            Err(e) => return ExportResult::error(name, accumulated, e.to_string()),
        };

        if records.is_empty() {
            return ExportResult::skipped(name, EMPTY_MESSAGE);
        }
        let count = records.len();

        // Converting
        observer.on_phase(name, ExportPhase::Converting);
        let at = (self.clock)();
        let content = match convert(format, &records, name, at) {
            Ok(content) => content,
            Err(e) => return ExportResult::error(name, count, e.to_string()),
        };
        drop(records);

        let path = match export_path(folder, name, at, format) {
            Ok(path) => path,
            Err(e) => return ExportResult::error(name, count, e.to_string()),
        };

        // Committing
        observer.on_phase(name, ExportPhase::Committing);
        let message = commit_message(name, count, at);
        match self.store.write_file(&path, &content, &message).await {
            Ok(commit) => {
                history.record(HistoryEntry {
                    timestamp: (self.clock)(),
                    resource: name.to_string(),
                    record_count: count,
                    path: path.clone(),
                    format,
                    commit_sha: commit.commit_sha.clone(),
                });
                ExportResult::success(name, count, path, commit.commit_sha)
            }
            Err(e) => ExportResult::error(name, count, e.to_string()),
        }
    }
}

impl std::fmt::Debug for Exporter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter").finish_non_exhaustive()
    }
}

// ============================================================================
// Counts
// ============================================================================

/// Fetches and stores the record count of every resource in the set.
///
/// A count the remote cannot provide is stored as unavailable, never as 0.
/// Returns the first validation error, which can only come from a name
/// that bypassed the set's own checks.
pub async fn refresh_counts(
    source: &dyn RecordSource,
    resources: &mut ResourceSet,
) -> Result<(), ExportError> {
    for name in resources.names() {
        let count = source.fetch_count(&name).await?;
        debug!(resource = %name, count = ?count, "Count refreshed");
        resources.set_count(&name, RecordCount::from_option(count));
    }
    Ok(())
}
