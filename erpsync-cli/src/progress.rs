//! Live export progress on stderr.
//!
//! One spinner per job. The prefix shows which resource is running, the
//! message shows its phase and how many records have been fetched.

use erpsync_core::{ExportPhase, ExportResult, PageProgress, ResultStatus};
use erpsync_export::{ExportObserver, ExportReport};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(120);

/// Spinner driven by the export observer callbacks.
pub struct SpinnerObserver {
    bar: Option<ProgressBar>,
}

impl SpinnerObserver {
    /// Creates an observer. A disabled one draws nothing.
    pub fn new(enabled: bool) -> Self {
        let bar = enabled.then(|| {
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
            if let Ok(style) =
                ProgressStyle::default_spinner().template("{spinner:.green} {prefix:.bold} {msg}")
            {
                bar.set_style(style);
            }
            bar.enable_steady_tick(TICK);
            bar
        });

        Self { bar }
    }

    fn set_message(&self, message: String) {
        if let Some(bar) = &self.bar {
            bar.set_message(message);
        }
    }

    fn println(&self, line: String) {
        if let Some(bar) = &self.bar {
            bar.println(line);
        }
    }
}

impl ExportObserver for SpinnerObserver {
    fn on_resource_start(&mut self, index: usize, total: usize, resource: &str) {
        if let Some(bar) = &self.bar {
            bar.set_prefix(format!("[{}/{}] {}", index + 1, total, resource));
        }
    }

    fn on_phase(&mut self, _resource: &str, phase: ExportPhase) {
        self.set_message(format!("{}...", phase.label()));
    }

    fn on_page(&mut self, _resource: &str, progress: PageProgress) {
        self.set_message(page_message(progress));
    }

    fn on_resource_complete(&mut self, _index: usize, result: &ExportResult) {
        self.println(result_line(result));
    }

    fn on_finished(&mut self, _report: &ExportReport) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Drop for SpinnerObserver {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

fn page_message(progress: PageProgress) -> String {
    let page = progress.page_index + 1;
    format!(
        "Fetching... page {page}, {} record{}",
        progress.accumulated,
        if progress.accumulated == 1 { "" } else { "s" }
    )
}

fn result_line(result: &ExportResult) -> String {
    let mark = match result.status {
        ResultStatus::Success => "✓",
        ResultStatus::Skipped => "-",
        ResultStatus::Error => "✗",
    };
    match (&result.path, &result.message) {
        (Some(path), _) => format!("{mark} {} ({} records) → {path}", result.resource, result.record_count),
        (None, Some(message)) => format!("{mark} {}: {message}", result.resource),
        (None, None) => format!("{mark} {}", result.resource),
    }
}
