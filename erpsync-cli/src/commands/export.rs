//! Export command - fetch, convert and commit entity sets.

use anyhow::Result;
use clap::Args;
use erpsync_core::{ExportFormat, ResourceOrigin};
use erpsync_export::{ExportJob, Exporter, PRESETS, find_preset};
use erpsync_store::{Session, SettingsStore};
use tracing::info;

use super::{TargetArgs, connect_erp, connect_github, fetch_context, resolve_settings};
use crate::output::{JsonFormatter, TextFormatter};
use crate::progress::SpinnerObserver;
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the export command.
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Entity sets to export, in order.
    pub resources: Vec<String>,

    /// Add every preset entity set.
    #[arg(long)]
    pub all_presets: bool,

    /// Add the presets of one category, e.g. Finance.
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<String>,

    /// File format: json or csv.
    #[arg(long = "as", value_name = "FORMAT")]
    pub file_format: Option<ExportFormat>,

    /// Stop after this many records per entity set (0 for no cap).
    #[arg(long, value_name = "N")]
    pub max_records: Option<usize>,

    #[command(flatten)]
    pub targets: TargetArgs,
}

impl ExportArgs {
    /// The selection with presets expanded, first occurrence wins.
    fn selection(&self) -> Vec<(String, ResourceOrigin)> {
        let mut selected: Vec<(String, ResourceOrigin)> = Vec::new();
        let mut push = |name: &str, origin| {
            if !selected.iter().any(|(n, _)| n == name) {
                selected.push((name.to_string(), origin));
            }
        };

        for name in &self.resources {
            match find_preset(name) {
                Some(preset) => push(preset.name, ResourceOrigin::Preset),
                None => push(name, ResourceOrigin::Manual),
            }
        }
        for preset in PRESETS {
            let in_category = self
                .category
                .as_deref()
                .is_some_and(|c| preset.category.eq_ignore_ascii_case(c));
            if self.all_presets || in_category {
                push(preset.name, ResourceOrigin::Preset);
            }
        }
        selected
    }
}

/// Runs the export command.
pub async fn run(args: &ExportArgs, cli: &Cli, store: &SettingsStore) -> Result<ExitCode> {
    let settings = resolve_settings(store, &args.targets).await?;
    let mut session = Session::new(settings.history_limit);

    // Reject bad names before signing in anywhere.
    for (name, origin) in args.selection() {
        session.resources.add(&name, origin)?;
    }
    let job = ExportJob::new(
        session.resources.names(),
        args.file_format.unwrap_or(settings.export.format),
    )
    .with_max_records(args.max_records.or(settings.export.max_records))
    .with_folder(settings.repository.folder.clone());
    job.validate()?;

    let ctx = fetch_context(&settings)?;
    let interactive = !args.targets.no_prompt;
    let source = connect_erp(&mut session, &ctx, &settings, interactive).await?;
    let target = connect_github(&mut session, &ctx, &settings, interactive).await?;
    target.verify().await?;

    info!(
        resources = job.resources.len(),
        repository = %target.full_name(),
        branch = %target.branch(),
        "Starting export"
    );

    let mut observer = SpinnerObserver::new(cli.show_progress());
    let report = Exporter::new(&source, &target)
        .run(&job, &mut session.history, &mut observer)
        .await?;
    drop(observer);

    let repository = target.full_name();
    let branch = target.branch();
    if !cli.quiet || cli.format == OutputFormat::Json {
        match cli.format {
            OutputFormat::Text => {
                let formatter = TextFormatter::new(!cli.no_color);
                let text = formatter.format_report(&report, &session.history, &repository, branch);
                println!("{text}");
            }
            OutputFormat::Json => {
                let formatter = JsonFormatter::new(cli.pretty);
                let json =
                    formatter.format_report(&report, &session.history, &repository, branch)?;
                println!("{json}");
            }
        }
    }

    Ok(if report.has_failures() {
        ExitCode::PartialFailure
    } else {
        ExitCode::Success
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(args: &ExportArgs) -> Vec<String> {
        args.selection().into_iter().map(|(n, _)| n).collect()
    }

    #[test]
    fn test_selection_keeps_order_and_dedups() {
        let args = ExportArgs {
            resources: vec!["MyEntity".into(), "customersv3".into(), "MyEntity".into()],
            ..ExportArgs::default()
        };
        assert_eq!(names(&args), vec!["MyEntity", "CustomersV3"]);
        assert_eq!(args.selection()[1].1, ResourceOrigin::Preset);
    }

    #[test]
    fn test_selection_by_category() {
        let args = ExportArgs {
            category: Some("finance".into()),
            ..ExportArgs::default()
        };
        let selected = names(&args);
        assert!(selected.contains(&"MainAccounts".to_string()));
        assert!(!selected.contains(&"CustomersV3".to_string()));
    }

    #[test]
    fn test_all_presets() {
        let args = ExportArgs {
            resources: vec!["Workers".into()],
            all_presets: true,
            ..ExportArgs::default()
        };
        let selected = names(&args);
        assert_eq!(selected.len(), PRESETS.len());
        assert_eq!(selected[0], "Workers");
    }

    #[test]
    fn test_invalid_name_passes_through_to_validation() {
        let args = ExportArgs {
            resources: vec!["Bad/Name".into()],
            ..ExportArgs::default()
        };
        let mut session = Session::new(5);
        let (name, origin) = args.selection().remove(0);
        assert!(session.resources.add(&name, origin).is_err());
    }
}
