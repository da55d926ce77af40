//! Session state.
//!
//! One `Session` lives for the whole process. It owns the access tokens,
//! the resource working set, and the export history. None of it is written
//! to disk.

use erpsync_fetch::AccessToken;
use tracing::info;

use crate::history::ExportHistory;
use crate::resources::ResourceSet;

/// Per-process state.
#[derive(Debug, Default)]
pub struct Session {
    erp_token: Option<AccessToken>,
    github_token: Option<AccessToken>,
    /// Resources picked for export.
    pub resources: ResourceSet,
    /// Committed exports, newest first.
    pub history: ExportHistory,
}

impl Session {
    /// Creates an empty session whose history keeps `history_limit` entries.
    pub fn new(history_limit: usize) -> Self {
        Self {
            history: ExportHistory::with_limit(history_limit),
            ..Self::default()
        }
    }

    /// Stores the ERP token after sign-in.
    pub fn connect_erp(&mut self, token: AccessToken) {
        info!(account = ?token.account_label, "ERP connected");
        self.erp_token = Some(token);
    }

    /// Stores the GitHub token after sign-in.
    pub fn connect_github(&mut self, token: AccessToken) {
        info!(account = ?token.account_label, "GitHub connected");
        self.github_token = Some(token);
    }

    /// The GitHub token.
    pub fn github_token(&self) -> Option<&AccessToken> {
        self.github_token.as_ref()
    }

    /// Returns true when both remotes are signed in.
    pub fn is_ready(&self) -> bool {
        self.erp_token.is_some() && self.github_token.is_some()
    }
}
