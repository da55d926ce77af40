// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

//! # erpsync Store
//!
//! Local state for erpsync.
//!
//! This crate provides:
//!
//! - **SettingsStore**: Connection and export preferences with persistence
//! - **Session**: Tokens, the resource working set, and export history,
//!   held in memory for the life of the process
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use erpsync_store::{Session, SettingsStore};
//!
//! let store = SettingsStore::load_default().await?;
//! let mut settings = store.get().await;
//! settings.apply_env(|var| std::env::var(var).ok())?;
//!
//! let mut session = Session::new(settings.history_limit);
//! session.resources.add("CustomersV3", ResourceOrigin::Preset)?;
//! ```

pub mod error;
pub mod history;
pub mod persistence;
pub mod resources;
pub mod session;
pub mod settings;

pub use error::StoreError;
pub use history::{ExportHistory, HistoryEntry};
pub use persistence::{
    default_config_dir, default_settings_path, load_json, load_json_or_default, save_json,
};
pub use resources::ResourceSet;
pub use session::Session;
pub use settings::{
    DEFAULT_HISTORY_LIMIT, ENV_BRANCH, ENV_ERP_URL, ENV_FOLDER, ENV_REPO, ErpSettings,
    ExportSettings, LogLevel, RepositorySettings, SETTING_KEYS, Settings, SettingsStore,
    parse_repo_slug,
};
