//! Resources command - list preset or discovered entity sets.

use anyhow::Result;
use clap::Args;
use erpsync_export::{PRESETS, Preset};
use erpsync_store::{Session, SettingsStore};
use tracing::info;

use super::{TargetArgs, connect_erp, fetch_context, resolve_settings};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the resources command.
#[derive(Args, Debug, Default)]
pub struct ResourcesArgs {
    /// Ask the environment for its published entity sets instead.
    #[arg(long)]
    pub discover: bool,

    /// Only presets of this category.
    #[arg(long, value_name = "CATEGORY", conflicts_with = "discover")]
    pub category: Option<String>,

    #[command(flatten)]
    pub targets: TargetArgs,
}

fn presets_in(category: Option<&str>) -> Vec<&'static Preset> {
    PRESETS
        .iter()
        .filter(|p| category.is_none_or(|c| p.category.eq_ignore_ascii_case(c)))
        .collect()
}

/// Runs the resources command.
pub async fn run(args: &ResourcesArgs, cli: &Cli, store: &SettingsStore) -> Result<ExitCode> {
    if !args.discover {
        let presets = presets_in(args.category.as_deref());
        match cli.format {
            OutputFormat::Text => {
                println!("{}", TextFormatter::new(!cli.no_color).format_presets(&presets));
            }
            OutputFormat::Json => {
                println!("{}", JsonFormatter::new(cli.pretty).format_presets(&presets)?);
            }
        }
        return Ok(ExitCode::Success);
    }

    let settings = resolve_settings(store, &args.targets).await?;
    let mut session = Session::new(settings.history_limit);
    let ctx = fetch_context(&settings)?;
    let source = connect_erp(&mut session, &ctx, &settings, !args.targets.no_prompt).await?;

    let names = source.discover().await?;
    info!(count = names.len(), url = %source.base_url(), "Entity sets discovered");

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_names(&names));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&names)?);
        }
    }

    Ok(ExitCode::Success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_in_category() {
        assert_eq!(presets_in(None).len(), PRESETS.len());

        let inventory = presets_in(Some("INVENTORY"));
        assert!(!inventory.is_empty());
        assert!(inventory.iter().all(|p| p.category == "Inventory"));

        assert!(presets_in(Some("Nope")).is_empty());
    }
}
