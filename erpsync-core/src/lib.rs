// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # erpsync Core
//!
//! Core types, models, and validation rules shared by every erpsync crate.
//!
//! ## Key Types
//!
//! ### Resources
//! - [`Resource`] - A named remote collection in the working set
//! - [`ResourceOrigin`] - Manual, preset, or discovered
//! - [`RecordCount`] - Known count or "unavailable"
//!
//! ### Export
//! - [`Record`] - One opaque JSON object from the collection service
//! - [`ExportFormat`] - csv or json
//! - [`ExportPhase`] - Job phase
//! - [`ExportResult`] - Per-resource outcome
//! - [`PageProgress`] - Pagination progress
//!
//! ### Validation
//! The [`validation`] module holds the rules applied to every identifier
//! before it is used to build a request path.

pub mod error;
pub mod models;
pub mod validation;

pub use error::ValidationError;

pub use models::{
    // Resources
    RecordCount,
    Resource,
    ResourceOrigin,
    // Export
    ExportFormat,
    ExportPhase,
    ExportResult,
    PageProgress,
    Record,
    ResultStatus,
};

pub use validation::{
    is_valid_resource_name, normalize_folder, sanitize_resource_name, validate_branch,
    validate_repo_identifier, validate_repo_path,
};
