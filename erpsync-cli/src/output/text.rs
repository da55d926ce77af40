//! Text output formatting with colors.

use erpsync_core::{ExportResult, RecordCount, Resource, ResultStatus};
use erpsync_export::{ExportReport, Preset};
use erpsync_fetch::RepositoryInfo;
use erpsync_store::{ExportHistory, HistoryEntry};

use super::json::CheckOutput;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats an export report: one line per resource, then totals, then
    /// the commits kept in the session history.
    pub fn format_report(
        &self,
        report: &ExportReport,
        history: &ExportHistory,
        repository: &str,
        branch: &str,
    ) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "{} → {}@{} ({})",
            self.bold("Export"),
            self.cyan(repository),
            branch,
            report.format
        ));
        lines.push("─".repeat(50));

        for result in &report.results {
            lines.push(self.format_result(result));
        }

        lines.push(String::new());
        let elapsed = report.finished_at - report.started_at;
        lines.push(format!(
            "{} succeeded, {} skipped, {} failed; {} records in {:.1}s",
            self.green(&report.succeeded().to_string()),
            self.yellow(&report.skipped().to_string()),
            if report.failed() > 0 {
                self.red(&report.failed().to_string())
            } else {
                report.failed().to_string()
            },
            report.total_records(),
            elapsed.num_milliseconds() as f64 / 1000.0
        ));

        if !history.is_empty() {
            lines.push(String::new());
            lines.push(self.bold("Commits (newest first)"));
            lines.extend(history.entries().map(|entry| self.format_history_entry(entry)));
        }

        lines.join("\n")
    }

    /// Formats one history line: time, resource, path and short sha.
    pub fn format_history_entry(&self, entry: &HistoryEntry) -> String {
        let mut line = format!(
            "  {} {:<28} {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.resource,
            entry.path
        );
        if let Some(sha) = &entry.commit_sha {
            line.push_str(&format!(" {}", self.dim(short_sha(sha))));
        }
        line
    }

    /// Formats a single result line.
    pub fn format_result(&self, result: &ExportResult) -> String {
        let status = match result.status {
            ResultStatus::Success => self.green("✓"),
            ResultStatus::Skipped => self.yellow("−"),
            ResultStatus::Error => self.red("✗"),
        };

        let mut line = format!("{} {:<28}", status, result.resource);
        match result.status {
            ResultStatus::Success => {
                line.push_str(&format!("{:>8} records", result.record_count));
                if let Some(path) = &result.path {
                    line.push_str(&format!("  {}", self.dim(path)));
                }
                if let Some(sha) = &result.commit_sha {
                    line.push_str(&format!(" {}", self.dim(short_sha(sha))));
                }
            }
            ResultStatus::Skipped | ResultStatus::Error => {
                let message = result.message.as_deref().unwrap_or("");
                if result.status == ResultStatus::Error {
                    line.push_str(&self.red(message));
                } else {
                    line.push_str(&self.dim(message));
                }
            }
        }
        line.trim_end().to_string()
    }

    /// Formats record counts.
    pub fn format_counts<'a>(&self, resources: impl IntoIterator<Item = &'a Resource>) -> String {
        let mut lines = vec![format!(
            "{:<32} {:<11} {}",
            self.bold("Resource"),
            self.bold("Origin"),
            self.bold("Records")
        )];

        for resource in resources {
            let count = match resource.record_count {
                Some(RecordCount::Unavailable) => self.yellow("unavailable"),
                Some(count) => count.to_string(),
                None => self.dim("-"),
            };
            lines.push(format!(
                "{:<32} {:<11} {}",
                resource.name(),
                resource.origin.label(),
                count
            ));
        }

        lines.join("\n")
    }

    /// Formats the preset catalogue, grouped by category.
    pub fn format_presets(&self, presets: &[&Preset]) -> String {
        let mut lines = Vec::new();
        let mut category = "";

        for preset in presets {
            if preset.category != category {
                if !lines.is_empty() {
                    lines.push(String::new());
                }
                lines.push(self.bold(preset.category));
                category = preset.category;
            }
            lines.push(format!(
                "  {:<28} {}",
                preset.name,
                self.dim(preset.description)
            ));
        }

        lines.join("\n")
    }

    /// Formats a plain list of resource names.
    pub fn format_names(&self, names: &[String]) -> String {
        let mut lines: Vec<String> = names.iter().map(|n| format!("  {n}")).collect();
        lines.push(self.dim(&format!("{} entity sets", names.len())));
        lines.join("\n")
    }

    /// Formats writable repositories.
    pub fn format_repositories(&self, repos: &[RepositoryInfo]) -> String {
        if repos.is_empty() {
            return self.dim("No repositories with push access");
        }

        repos
            .iter()
            .map(|r| {
                let visibility = if r.private { "private" } else { "public" };
                let branch = r.default_branch.as_deref().unwrap_or("-");
                format!(
                    "{:<40} {:<8} {}",
                    r.full_name,
                    self.dim(visibility),
                    self.dim(branch)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats connection checks.
    pub fn format_checks(&self, checks: &[CheckOutput]) -> String {
        checks
            .iter()
            .map(|c| {
                let status = if c.ok {
                    self.green("✓")
                } else {
                    self.red("✗")
                };
                format!("{:<10} {} {}", c.target, status, c.detail)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats settings, one key per line.
    pub fn format_settings(&self, entries: &[(&str, String)]) -> String {
        let mut lines = vec![self.bold("erpsync Configuration"), "─".repeat(40)];
        for (key, value) in entries {
            let value = if value == "(unset)" {
                self.dim(value)
            } else {
                value.clone()
            };
            lines.push(format!("{key:<20} {value}"));
        }
        lines.join("\n")
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_sha() {
        assert_eq!(short_sha("0123456789abcdef"), "0123456");
        assert_eq!(short_sha("abc"), "abc");
    }

    #[test]
    fn test_colors_toggle() {
        assert_eq!(TextFormatter::new(false).red("x"), "x");
        assert_eq!(TextFormatter::new(true).red("x"), "\x1b[31mx\x1b[0m");
    }
}
