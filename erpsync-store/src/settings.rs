//! User settings.
//!
//! Settings hold everything needed to reach the two remotes except the
//! tokens, which never leave process memory. Values come from, in rising
//! precedence: defaults, the settings file, environment, CLI flags.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use erpsync_core::{ExportFormat, normalize_folder, validate_branch, validate_repo_identifier};
use erpsync_fetch::{DEFAULT_API_BASE, FetchSettings, validate_host};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json, remove_file_if_exists, save_json};

/// Default number of history entries kept per session.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Environment variable overriding the ERP base URL.
pub const ENV_ERP_URL: &str = "ERPSYNC_ERP_URL";
/// Environment variable overriding the repository (`owner/name`).
pub const ENV_REPO: &str = "ERPSYNC_REPO";
/// Environment variable overriding the branch.
pub const ENV_BRANCH: &str = "ERPSYNC_BRANCH";
/// Environment variable overriding the export folder.
pub const ENV_FOLDER: &str = "ERPSYNC_FOLDER";

// ============================================================================
// Settings Types
// ============================================================================

/// ERP connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErpSettings {
    /// Normalized environment URL, without `/data`.
    pub base_url: Option<String>,
    /// Page size hint sent with every list request.
    pub page_size: Option<u32>,
    /// Per-request timeout in seconds. Unset means no explicit timeout.
    pub http_timeout_secs: Option<u64>,
}

/// Target repository settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositorySettings {
    /// Repository owner.
    pub owner: Option<String>,
    /// Repository name.
    pub name: Option<String>,
    /// Branch commits go to.
    pub branch: String,
    /// Folder inside the repository. Empty means the root.
    pub folder: String,
    /// GitHub REST API base.
    pub api_base: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            owner: None,
            name: None,
            branch: "main".to_string(),
            folder: "exports".to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Export defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Output format when none is given.
    pub format: ExportFormat,
    /// Per-resource record cap when none is given.
    pub max_records: Option<usize>,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(format!("unknown log level {other:?}")),
        }
    }
}

/// User preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// ERP connection.
    pub erp: ErpSettings,
    /// Target repository.
    pub repository: RepositorySettings,
    /// Export defaults.
    pub export: ExportSettings,
    /// Session history bound.
    pub history_limit: usize,
    /// Default log level for the CLI.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            erp: ErpSettings::default(),
            repository: RepositorySettings::default(),
            export: ExportSettings::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            log_level: LogLevel::default(),
        }
    }
}

/// Keys accepted by [`Settings::set_value`].
pub const SETTING_KEYS: &[&str] = &[
    "erp.url",
    "erp.page_size",
    "erp.timeout_secs",
    "repo",
    "repo.branch",
    "repo.folder",
    "repo.api_base",
    "export.format",
    "export.max_records",
    "history.limit",
    "log_level",
];

/// Splits `owner/name` and validates both halves.
pub fn parse_repo_slug(slug: &str) -> Result<(String, String), StoreError> {
    let slug = slug.trim().trim_end_matches(".git");
    let (owner, name) = slug
        .split_once('/')
        .ok_or_else(|| StoreError::invalid("repo", "expected owner/name"))?;
    validate_repo_identifier(owner)?;
    validate_repo_identifier(name)?;
    Ok((owner.to_string(), name.to_string()))
}

fn is_unset(value: &str) -> bool {
    matches!(value.trim(), "" | "none" | "unset")
}

fn parse_optional<T: std::str::FromStr>(key: &str, value: &str) -> Result<Option<T>, StoreError> {
    if is_unset(value) {
        return Ok(None);
    }
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|_| StoreError::invalid(key, format!("{value:?} is not a number")))
}

impl Settings {
    /// Returns `(owner, name)` when both are configured.
    pub fn repository(&self) -> Option<(&str, &str)> {
        Some((
            self.repository.owner.as_deref()?,
            self.repository.name.as_deref()?,
        ))
    }

    /// The configured request timeout.
    pub fn http_timeout(&self) -> Option<Duration> {
        self.erp.http_timeout_secs.map(Duration::from_secs)
    }

    /// Settings for the remote clients.
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings::default()
            .with_timeout(self.http_timeout())
            .with_github_api_base(self.repository.api_base.clone())
    }

    /// Sets one value by key, validating it first.
    ///
    /// `""`, `none` and `unset` clear optional values.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        match key {
            "erp.url" => {
                self.erp.base_url = if is_unset(value) {
                    None
                } else {
                    Some(validate_host(value).ok_or_else(|| {
                        StoreError::invalid(key, format!("{value:?} is not an allowed ERP host"))
                    })?)
                };
            }
            "erp.page_size" => {
                let size: Option<u32> = parse_optional(key, value)?;
                if size == Some(0) {
                    return Err(StoreError::invalid(key, "must be greater than zero"));
                }
                self.erp.page_size = size;
            }
            "erp.timeout_secs" => {
                self.erp.http_timeout_secs = parse_optional::<u64>(key, value)?.filter(|s| *s > 0);
            }
            "repo" => {
                if is_unset(value) {
                    self.repository.owner = None;
                    self.repository.name = None;
                } else {
                    let (owner, name) = parse_repo_slug(value)?;
                    self.repository.owner = Some(owner);
                    self.repository.name = Some(name);
                }
            }
            "repo.branch" => {
                let branch = value.trim();
                validate_branch(branch)?;
                self.repository.branch = branch.to_string();
            }
            "repo.folder" => {
                self.repository.folder = normalize_folder(value)?.unwrap_or_default();
            }
            "repo.api_base" => {
                let base = value.trim().trim_end_matches('/');
                if !base.starts_with("https://") {
                    return Err(StoreError::invalid(key, "must be an https:// URL"));
                }
                self.repository.api_base = base.to_string();
            }
            "export.format" => {
                self.export.format = value
                    .parse()
                    .map_err(|e: String| StoreError::invalid(key, e))?;
            }
            "export.max_records" => {
                self.export.max_records = parse_optional::<usize>(key, value)?.filter(|n| *n > 0);
            }
            "history.limit" => {
                self.history_limit = parse_optional::<usize>(key, value)?
                    .ok_or_else(|| StoreError::invalid(key, "a number is required"))?;
            }
            "log_level" => {
                self.log_level = value.parse().map_err(|e: String| StoreError::invalid(key, e))?;
            }
            other => return Err(StoreError::UnknownKey(other.to_string())),
        }
        debug!(key, "Setting updated");
        Ok(())
    }

    /// Current value of every key, in [`SETTING_KEYS`] order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let opt = |v: Option<String>| v.unwrap_or_else(|| "(unset)".to_string());
        vec![
            ("erp.url", opt(self.erp.base_url.clone())),
            ("erp.page_size", opt(self.erp.page_size.map(|v| v.to_string()))),
            ("erp.timeout_secs", opt(self.erp.http_timeout_secs.map(|v| v.to_string()))),
            (
                "repo",
                opt(self.repository().map(|(o, n)| format!("{o}/{n}"))),
            ),
            ("repo.branch", self.repository.branch.clone()),
            ("repo.folder", self.repository.folder.clone()),
            ("repo.api_base", self.repository.api_base.clone()),
            ("export.format", self.export.format.to_string()),
            ("export.max_records", opt(self.export.max_records.map(|v| v.to_string()))),
            ("history.limit", self.history_limit.to_string()),
            ("log_level", self.log_level.to_string()),
        ]
    }

    /// Applies environment overrides read through `get`.
    ///
    /// Empty variables are ignored. An invalid value is an error, so a typo
    /// in the environment never silently falls back to the file.
    pub fn apply_env<F>(&mut self, get: F) -> Result<(), StoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides = [
            (ENV_ERP_URL, "erp.url"),
            (ENV_REPO, "repo"),
            (ENV_BRANCH, "repo.branch"),
            (ENV_FOLDER, "repo.folder"),
        ];

        for (var, key) in overrides {
            if let Some(value) = get(var).filter(|v| !v.trim().is_empty()) {
                debug!(var, key, "Applying environment override");
                self.set_value(key, &value).map_err(|e| {
                    StoreError::Config(format!("{var}: {e}"))
                })?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Persistent settings store.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store with default settings.
    pub fn new(path: PathBuf) -> Self {
        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            path,
        }
    }

    /// Loads settings from the default path.
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path.
    ///
    /// A missing file yields defaults. A malformed one is logged and
    /// replaced by defaults in memory; the file is left untouched.
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let settings = if path.exists() {
            info!(path = %path.display(), "Loading settings");
            load_json(&path).await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            })
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };

        Ok(Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
        })
    }

    /// Path of the settings file.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings in memory.
    pub async fn update<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut Settings) -> T,
    {
        let mut settings = self.settings.write().await;
        f(&mut settings)
    }

    /// Validates and sets one key in memory.
    pub async fn set_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|s| s.set_value(key, value)).await
    }

    /// Saves settings to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    /// Restores defaults and deletes the settings file.
    pub async fn reset(&self) -> Result<(), StoreError> {
        *self.settings.write().await = Settings::default();
        if remove_file_if_exists(&self.path).await? {
            info!(path = %self.path.display(), "Settings file removed");
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.repository.branch, "main");
        assert_eq!(settings.repository.folder, "exports");
        assert_eq!(settings.repository.api_base, DEFAULT_API_BASE);
        assert_eq!(settings.export.format, ExportFormat::Json);
        assert_eq!(settings.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(settings.http_timeout(), None);
        assert!(settings.repository().is_none());
    }

    #[test]
    fn test_set_value_validates() {
        let mut settings = Settings::default();

        settings
            .set_value("erp.url", "contoso.operations.dynamics.com/data/")
            .unwrap();
        assert_eq!(
            settings.erp.base_url.as_deref(),
            Some("https://contoso.operations.dynamics.com")
        );
        assert!(settings.set_value("erp.url", "https://evil.com").is_err());

        settings.set_value("repo", "acme/erp-data").unwrap();
        assert_eq!(settings.repository(), Some(("acme", "erp-data")));
        assert!(settings.set_value("repo", "acme").is_err());
        assert!(settings.set_value("repo", "acme/../x").is_err());

        settings.set_value("repo.folder", "/data/exports/").unwrap();
        assert_eq!(settings.repository.folder, "data/exports");
        settings.set_value("repo.folder", "").unwrap();
        assert_eq!(settings.repository.folder, "");
        assert!(settings.set_value("repo.folder", "../up").is_err());

        assert!(settings.set_value("repo.branch", "feature/x").is_ok());
        assert!(settings.set_value("repo.branch", "a..b").is_err());

        settings.set_value("export.format", "csv").unwrap();
        assert_eq!(settings.export.format, ExportFormat::Csv);

        settings.set_value("export.max_records", "500").unwrap();
        assert_eq!(settings.export.max_records, Some(500));
        settings.set_value("export.max_records", "0").unwrap();
        assert_eq!(settings.export.max_records, None);

        assert!(settings.set_value("erp.page_size", "0").is_err());
        assert!(settings.set_value("history.limit", "lots").is_err());
        assert!(settings.set_value("repo.api_base", "http://insecure").is_err());
    }

    #[test]
    fn test_unknown_key() {
        let mut settings = Settings::default();
        let err = settings.set_value("erp.password", "x").unwrap_err();
        assert!(matches!(err, StoreError::UnknownKey(_)));
    }

    #[test]
    fn test_entries_cover_every_key() {
        let settings = Settings::default();
        let keys: Vec<_> = settings.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, SETTING_KEYS);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut settings = Settings::default();
        settings.set_value("repo", "file/repo").unwrap();

        let env: HashMap<&str, &str> = [
            (ENV_REPO, "env/repo"),
            (ENV_BRANCH, "release"),
            (ENV_FOLDER, "   "),
        ]
        .into_iter()
        .collect();

        settings
            .apply_env(|var| env.get(var).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(settings.repository(), Some(("env", "repo")));
        assert_eq!(settings.repository.branch, "release");
        assert_eq!(settings.repository.folder, "exports");
    }

    #[test]
    fn test_invalid_env_value_is_error() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env(|var| (var == ENV_ERP_URL).then(|| "https://evil.com".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_ERP_URL));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"repository": {"owner": "acme"}}"#).unwrap();
        assert_eq!(settings.repository.owner.as_deref(), Some("acme"));
        assert_eq!(settings.repository.branch, "main");
        assert_eq!(settings.history_limit, DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn test_fetch_settings() {
        let mut settings = Settings::default();
        settings.set_value("erp.timeout_secs", "45").unwrap();
        let fetch = settings.fetch_settings();
        assert_eq!(fetch.timeout, Some(Duration::from_secs(45)));
        assert_eq!(fetch.github_api_base, DEFAULT_API_BASE);
    }

    #[tokio::test]
    async fn test_store_save_load_reset() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone());
        store.set_value("repo", "acme/data").await.unwrap();
        store.set_value("export.format", "csv").await.unwrap();
        store.save().await.unwrap();

        let loaded = SettingsStore::load(path.clone()).await.unwrap();
        assert_eq!(loaded.get().await, store.get().await);

        loaded.reset().await.unwrap();
        assert!(!path.exists());
        assert_eq!(loaded.get().await, Settings::default());
    }

    #[tokio::test]
    async fn test_store_malformed_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("settings.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = SettingsStore::load(path).await.unwrap();
        assert_eq!(store.get().await, Settings::default());
    }
}
