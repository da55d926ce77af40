//! Export progress observer.

use erpsync_core::{ExportPhase, ExportResult, PageProgress};

use crate::orchestrator::ExportReport;

/// Receives progress from the orchestrator.
///
/// Callbacks fire inline on the exporting task, in order. Every method has
/// an empty default.
pub trait ExportObserver: Send {
    /// A resource is about to be processed. `index` is zero-based.
    fn on_resource_start(&mut self, _index: usize, _total: usize, _resource: &str) {}

    /// The current resource entered a new phase.
    fn on_phase(&mut self, _resource: &str, _phase: ExportPhase) {}

    /// A page of the current resource was appended.
    fn on_page(&mut self, _resource: &str, _progress: PageProgress) {}

    /// A resource finished with the given result.
    fn on_resource_complete(&mut self, _index: usize, _result: &ExportResult) {}

    /// Every resource has been processed; the job is terminal.
    fn on_finished(&mut self, _report: &ExportReport) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ExportObserver for NoopObserver {}
