// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

//! # erpsync Export
//!
//! The export pipeline: fetch every page of a resource, convert the records,
//! commit the file, and move on to the next resource whatever happened.
//!
//! - [`convert`] - csv and json rendering of a record set
//! - [`orchestrator::Exporter`] - Runs an [`orchestrator::ExportJob`]
//! - [`observer::ExportObserver`] - Progress callbacks
//! - [`sources`] - The [`sources::RecordSource`] / [`sources::FileStore`]
//!   seams and their adapters over the remote clients
//! - [`presets`] - Commonly exported entity sets
//!
//! ## Usage
//!
//! ```ignore
//! use erpsync_export::{ErpCollection, ExportJob, Exporter, GitHubRepository, NoopObserver};
//!
//! let source = ErpCollection::new(ctx.odata(), base_url, erp_token);
//! let store = GitHubRepository::new(ctx.github(), "acme", "erp-data", "main", gh_token);
//!
//! let job = ExportJob::new(["CustomersV3", "VendorsV2"], ExportFormat::Csv)
//!     .with_folder("exports");
//! let report = Exporter::new(&source, &store)
//!     .run(&job, &mut session.history, &mut NoopObserver)
//!     .await?;
//! ```

pub mod convert;
pub mod error;
pub mod observer;
pub mod orchestrator;
pub mod path;
pub mod presets;
pub mod sources;

pub use convert::{header_columns, to_csv, to_json};
pub use error::{ConvertError, ExportError};
pub use observer::{ExportObserver, NoopObserver};
pub use orchestrator::{ExportJob, ExportReport, Exporter, refresh_counts};
pub use path::{commit_message, export_path, file_timestamp};
pub use presets::{PRESETS, Preset, find_preset, preset_names};
pub use sources::{ErpCollection, FileStore, GitHubRepository, RecordSource};
