//! CLI command implementations.
//!
//! Shared here: settings resolution (flags over environment over file) and
//! the connection helpers that turn settings plus a token into the export
//! adapters.

pub mod check;
pub mod config;
pub mod count;
pub mod export;
pub mod repos;
pub mod resources;

use anyhow::{Context, Result, anyhow};
use clap::Args;
use erpsync_export::{ErpCollection, GitHubRepository};
use erpsync_fetch::{FetchContext, TokenProvider, acquire_token};
use erpsync_store::{ENV_ERP_URL, ENV_REPO, Session, Settings, SettingsStore, StoreError};
use tracing::debug;

use crate::auth::CliTokenProvider;

/// Connection overrides for a single run.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// ERP environment URL, e.g. contoso.operations.dynamics.com.
    #[arg(long, value_name = "URL")]
    pub erp_url: Option<String>,

    /// Target repository as owner/name.
    #[arg(long, value_name = "OWNER/NAME")]
    pub repo: Option<String>,

    /// Branch to commit to.
    #[arg(long)]
    pub branch: Option<String>,

    /// Folder inside the repository ("" for the root).
    #[arg(long)]
    pub folder: Option<String>,

    /// Never prompt for a missing token.
    #[arg(long)]
    pub no_prompt: bool,
}

impl TargetArgs {
    /// Applies the flags that were given on top of `settings`.
    pub fn apply(&self, settings: &mut Settings) -> Result<(), StoreError> {
        let overrides = [
            ("erp.url", &self.erp_url),
            ("repo", &self.repo),
            ("repo.branch", &self.branch),
            ("repo.folder", &self.folder),
        ];
        for (key, value) in overrides {
            if let Some(value) = value {
                debug!(key, "Applying command-line override");
                settings.set_value(key, value)?;
            }
        }
        Ok(())
    }
}

/// Settings for this run: file, then environment, then flags.
pub async fn resolve_settings(store: &SettingsStore, targets: &TargetArgs) -> Result<Settings> {
    let mut settings = store.get().await;
    settings.apply_env(|var| std::env::var(var).ok())?;
    targets.apply(&mut settings)?;
    Ok(settings)
}

/// The configured ERP environment URL.
pub fn erp_url(settings: &Settings) -> Result<&str> {
    settings.erp.base_url.as_deref().ok_or_else(|| {
        anyhow!(
            "no ERP environment configured; pass --erp-url, set {ENV_ERP_URL}, \
             or run `erpsync config set erp.url <URL>`"
        )
    })
}

/// The configured `(owner, name)`.
pub fn repository(settings: &Settings) -> Result<(&str, &str)> {
    settings.repository().ok_or_else(|| {
        anyhow!(
            "no repository configured; pass --repo, set {ENV_REPO}, \
             or run `erpsync config set repo <OWNER/NAME>`"
        )
    })
}

/// HTTP context for the configured timeout and API base.
pub fn fetch_context(settings: &Settings) -> Result<FetchContext> {
    FetchContext::with_settings(settings.fetch_settings()).context("failed to build HTTP client")
}

/// Signs in to the ERP environment and binds a record source to it.
pub async fn connect_erp(
    session: &mut Session,
    ctx: &FetchContext,
    settings: &Settings,
    interactive: bool,
) -> Result<ErpCollection> {
    let base_url = erp_url(settings)?;
    let provider = CliTokenProvider::erp(interactive);
    let token = acquire_token(&provider)
        .await
        .with_context(|| format!("{} sign-in failed", provider.service()))?;
    session.connect_erp(token.clone());

    Ok(ErpCollection::new(ctx.odata(), base_url, token).with_page_size(settings.erp.page_size))
}

/// Signs in to GitHub and binds a file store to the configured repository.
///
/// The token's login is looked up so the session knows which account it
/// holds.
pub async fn connect_github(
    session: &mut Session,
    ctx: &FetchContext,
    settings: &Settings,
    interactive: bool,
) -> Result<GitHubRepository> {
    let (owner, name) = repository(settings)?;
    let provider = CliTokenProvider::github(interactive);
    let token = acquire_token(&provider)
        .await
        .with_context(|| format!("{} sign-in failed", provider.service()))?;

    let client = ctx.github();
    let user = client
        .current_user(token.secret())
        .await
        .context("GitHub rejected the token")?;
    let token = token.with_account(user.login);
    session.connect_github(token.clone());

    Ok(GitHubRepository::new(
        client,
        owner,
        name,
        settings.repository.branch.clone(),
        token,
    ))
}
