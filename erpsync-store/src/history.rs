//! Export history tracking.

use chrono::{DateTime, Utc};
use erpsync_core::ExportFormat;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::settings::DEFAULT_HISTORY_LIMIT;

/// A single committed export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// When the commit finished.
    pub timestamp: DateTime<Utc>,
    /// Resource name.
    pub resource: String,
    /// Records written.
    pub record_count: usize,
    /// Repository path.
    pub path: String,
    /// Output format.
    pub format: ExportFormat,
    /// Commit sha, if the remote reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
}

/// Bounded, most-recent-first list of committed exports.
#[derive(Debug, Clone)]
pub struct ExportHistory {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl Default for ExportHistory {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl ExportHistory {
    /// Creates an empty history with the default bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty history keeping at most `limit` entries.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit.min(64)),
            limit,
        }
    }

    /// Records an entry at the front, dropping the oldest past the bound.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.limit);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// The newest entry.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The bound.
    pub fn limit(&self) -> usize {
        self.limit
    }
}
