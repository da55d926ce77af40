// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! erpsync CLI - export ERP entity sets into a GitHub repository.
//!
//! # Examples
//!
//! ```bash
//! # One-time setup
//! erpsync config set erp.url contoso.operations.dynamics.com
//! erpsync config set repo acme/erp-data
//!
//! # Export two entity sets as csv
//! erpsync export CustomersV3 VendorsV2 --as csv
//!
//! # Export every preset, at most 500 records each
//! erpsync export --all-presets --max-records 500
//!
//! # Record counts
//! erpsync count CustomersV3 SalesOrderLines
//!
//! # Entity sets published by the environment
//! erpsync resources --discover
//!
//! # JSON output
//! erpsync export CustomersV3 --format json --pretty
//! ```

mod auth;
mod commands;
mod output;
mod progress;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use erpsync_core::ValidationError;
use erpsync_export::ExportError;
use erpsync_fetch::FetchError;
use erpsync_store::{LogLevel, SettingsStore, StoreError};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{check, config, count, export, repos, resources};

// ============================================================================
// CLI Definition
// ============================================================================

/// erpsync CLI - ERP to GitHub exports.
#[derive(Parser)]
#[command(name = "erpsync")]
#[command(about = "Export ERP OData entity sets into a GitHub repository")]
#[command(long_about = r#"
erpsync fetches entity sets from a finance and operations environment page
by page, converts them to csv or json, and commits one file per entity set
to a GitHub repository.

Tokens are read from the environment:
  ERPSYNC_ERP_TOKEN                     ERP bearer token
  ERPSYNC_GITHUB_TOKEN or GITHUB_TOKEN  GitHub token

When a token is missing and a terminal is attached, erpsync asks for it.

Examples:
  erpsync export CustomersV3 --as csv   # Export one entity set
  erpsync export --all-presets          # Export every preset
  erpsync count CustomersV3             # Record count
  erpsync resources --discover          # List published entity sets
  erpsync check                         # Verify both connections
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Returns true when live progress should be drawn.
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text
    }
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Export entity sets to the repository.
    #[command(visible_alias = "e")]
    Export(export::ExportArgs),

    /// Show record counts.
    #[command(visible_alias = "c")]
    Count(count::CountArgs),

    /// List preset or discovered entity sets.
    #[command(visible_alias = "r")]
    Resources(resources::ResourcesArgs),

    /// List repositories the GitHub token can push to.
    Repos,

    /// Verify the ERP and GitHub connections.
    Check(check::CheckArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// At least one resource failed.
    PartialFailure = 2,
    /// Input was rejected before any request.
    InvalidInput = 3,
}

impl ExitCode {
    /// Picks the exit code for an error that ended the command.
    pub fn for_error(error: &anyhow::Error) -> Self {
        let invalid = error.chain().any(|cause| {
            cause.downcast_ref::<ValidationError>().is_some()
                || cause
                    .downcast_ref::<ExportError>()
                    .is_some_and(ExportError::is_validation)
                || cause
                    .downcast_ref::<FetchError>()
                    .is_some_and(FetchError::is_validation)
                || cause.downcast_ref::<StoreError>().is_some_and(|e| {
                    matches!(
                        e,
                        StoreError::Validation(_)
                            | StoreError::InvalidValue { .. }
                            | StoreError::UnknownKey(_)
                    )
                })
        });
        if invalid { Self::InvalidInput } else { Self::Error }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("erpsync=debug,info")
    } else {
        EnvFilter::new(format!("erpsync={level}"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(ExitCode::InvalidInput as i32);
        }
        Err(e) => e.exit(),
    };

    let store = SettingsStore::load_default().await?;
    setup_logging(cli.verbose, cli.quiet, store.get().await.log_level);

    let result = match &cli.command {
        Commands::Export(args) => export::run(args, &cli, &store).await,
        Commands::Count(args) => count::run(args, &cli, &store).await,
        Commands::Resources(args) => resources::run(args, &cli, &store).await,
        Commands::Repos => repos::run(&cli, &store).await,
        Commands::Check(args) => check::run(args, &cli, &store).await,
        Commands::Config(args) => config::run(args, &cli, &store).await,
    };

    match result {
        Ok(ExitCode::Success) => Ok(()),
        Ok(code) => std::process::exit(code as i32),
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            std::process::exit(ExitCode::for_error(&e) as i32);
        }
    }
}
