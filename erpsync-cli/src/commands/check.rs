//! Check command - verify both connections without exporting.

use anyhow::Result;
use clap::Args;
use erpsync_store::{Session, SettingsStore};

use super::{TargetArgs, connect_erp, connect_github, fetch_context, resolve_settings};
use crate::output::{CheckOutput, JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the check command.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    pub targets: TargetArgs,
}

/// Runs the check command.
pub async fn run(args: &CheckArgs, cli: &Cli, store: &SettingsStore) -> Result<ExitCode> {
    let settings = resolve_settings(store, &args.targets).await?;
    let mut session = Session::new(settings.history_limit);
    let ctx = fetch_context(&settings)?;
    let interactive = !args.targets.no_prompt;

    let mut checks = Vec::with_capacity(2);

    let erp = match connect_erp(&mut session, &ctx, &settings, interactive).await {
        Ok(source) => match source.discover().await {
            Ok(names) => CheckOutput::ok(
                "ERP",
                format!("{} ({} entity sets)", source.base_url(), names.len()),
            ),
            Err(e) => CheckOutput::failed("ERP", e.to_string()),
        },
        Err(e) => CheckOutput::failed("ERP", format!("{e:#}")),
    };
    checks.push(erp);

    let github = match connect_github(&mut session, &ctx, &settings, interactive).await {
        Ok(target) => match target.verify().await {
            Ok(info) => {
                let account = session
                    .github_token()
                    .and_then(|t| t.account_label.as_deref())
                    .unwrap_or("unknown");
                CheckOutput::ok(
                    "GitHub",
                    format!("{} can push to {}@{}", account, info.full_name, target.branch()),
                )
            }
            Err(e) => CheckOutput::failed("GitHub", e.to_string()),
        },
        Err(e) => CheckOutput::failed("GitHub", format!("{e:#}")),
    };
    checks.push(github);

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_checks(&checks));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&checks)?);
        }
    }

    Ok(if checks.iter().all(|c| c.ok) && session.is_ready() {
        ExitCode::Success
    } else {
        ExitCode::Error
    })
}
