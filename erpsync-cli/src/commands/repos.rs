//! Repos command - repositories the token can push to.

use anyhow::{Context, Result};
use erpsync_fetch::acquire_token;
use erpsync_store::SettingsStore;
use tracing::info;

use super::{TargetArgs, fetch_context, resolve_settings};
use crate::auth::CliTokenProvider;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Runs the repos command.
pub async fn run(cli: &Cli, store: &SettingsStore) -> Result<ExitCode> {
    let settings = resolve_settings(store, &TargetArgs::default()).await?;
    let ctx = fetch_context(&settings)?;

    let token = acquire_token(&CliTokenProvider::github(true))
        .await
        .context("GitHub sign-in failed")?;
    let repos = ctx
        .github()
        .list_writable_repositories(token.secret())
        .await?;
    info!(count = repos.len(), "Writable repositories listed");

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_repositories(&repos));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format_repositories(&repos)?);
        }
    }

    Ok(ExitCode::Success)
}
