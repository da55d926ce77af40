//! Domain models for erpsync.
//!
//! ## Submodules
//!
//! - [`resource`] - Resource types (Resource, ResourceOrigin, RecordCount)
//! - [`export`] - Export types (ExportFormat, ExportPhase, ExportResult, Record)

mod export;
mod resource;

pub use export::{ExportFormat, ExportPhase, ExportResult, PageProgress, Record, ResultStatus};
pub use resource::{RecordCount, Resource, ResourceOrigin};
