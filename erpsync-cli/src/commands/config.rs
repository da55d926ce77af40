//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use erpsync_store::{SETTING_KEYS, SettingsStore, default_config_dir};
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Set one value, e.g. `repo acme/erp-data`. Use "unset" to clear.
    Set {
        /// Setting key (see `config keys`).
        key: String,

        /// New value.
        value: String,
    },

    /// List the keys `set` accepts.
    Keys,

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli, store: &SettingsStore) -> Result<ExitCode> {
    match &args.action {
        ConfigAction::Show => show_config(cli, store).await?,
        ConfigAction::Path => show_paths(cli, store)?,
        ConfigAction::Set { key, value } => set_value(key, value, cli, store).await?,
        ConfigAction::Keys => show_keys(cli)?,
        ConfigAction::Reset => reset_config(cli, store).await?,
    }
    Ok(ExitCode::Success)
}

async fn show_config(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let settings = store.get().await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_settings(&settings.entries()));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = store.path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", settings_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": settings_path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

fn show_keys(cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            for key in SETTING_KEYS {
                println!("{key}");
            }
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&SETTING_KEYS)?);
        }
    }
    Ok(())
}

async fn set_value(key: &str, value: &str, cli: &Cli, store: &SettingsStore) -> Result<()> {
    store.set_value(key, value).await?;
    store.save().await?;

    let current = store
        .get()
        .await
        .entries()
        .into_iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
        .unwrap_or_default();

    info!(key, "Setting saved");
    if !cli.quiet {
        println!("{key} = {current}");
    }

    Ok(())
}

async fn reset_config(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let existed = store.path().exists();
    store.reset().await?;

    if !cli.quiet {
        if existed {
            println!("Configuration reset to defaults");
        } else {
            println!("No configuration file to reset");
        }
    }

    Ok(())
}
