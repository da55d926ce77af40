//! Count command - record counts per entity set.

use anyhow::Result;
use clap::Args;
use erpsync_core::ResourceOrigin;
use erpsync_export::{preset_names, refresh_counts};
use erpsync_store::{Session, SettingsStore};

use super::{TargetArgs, connect_erp, fetch_context, resolve_settings};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the count command.
#[derive(Args, Debug, Default)]
pub struct CountArgs {
    /// Entity sets to count. Defaults to every preset.
    pub resources: Vec<String>,

    #[command(flatten)]
    pub targets: TargetArgs,
}

/// Runs the count command.
pub async fn run(args: &CountArgs, cli: &Cli, store: &SettingsStore) -> Result<ExitCode> {
    let settings = resolve_settings(store, &args.targets).await?;
    let mut session = Session::new(settings.history_limit);

    if args.resources.is_empty() {
        session
            .resources
            .add_all(preset_names(), ResourceOrigin::Preset)?;
    } else {
        session
            .resources
            .add_all(args.resources.iter().map(String::as_str), ResourceOrigin::Manual)?;
    }

    let ctx = fetch_context(&settings)?;
    let source = connect_erp(&mut session, &ctx, &settings, !args.targets.no_prompt).await?;
    refresh_counts(&source, &mut session.resources).await?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_counts(session.resources.iter()));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_counts(session.resources.iter())?);
        }
    }

    Ok(ExitCode::Success)
}
