//! Fetch context bundling the transport and client settings.
//!
//! Both remote clients share one transport. The context builds them on
//! demand with the configured settings applied.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::HttpError;
use crate::github::{DEFAULT_API_BASE, RepositoryClient};
use crate::host::http::{HttpClient, HttpTransport};
use crate::odata::{ALLOWED_HOST_SUFFIXES, CollectionClient};

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for the remote clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Overall per-request timeout. `None` leaves the transport default.
    pub timeout: Option<Duration>,
    /// GitHub REST API base.
    pub github_api_base: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: None,
            github_api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl FetchSettings {
    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the GitHub API base.
    pub fn with_github_api_base(mut self, base: impl Into<String>) -> Self {
        self.github_api_base = base.into();
        self
    }

    /// Domains the default transport may contact.
    fn allowed_domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = ALLOWED_HOST_SUFFIXES
            .iter()
            .map(|suffix| suffix.trim_start_matches('.').to_string())
            .collect();

        match Url::parse(&self.github_api_base)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
        {
            Some(host) => domains.push(host),
            None => domains.push("api.github.com".to_string()),
        }
        domains
    }
}

// ============================================================================
// Fetch Context
// ============================================================================

/// Shared transport plus settings, handed to every remote call site.
#[derive(Clone)]
pub struct FetchContext {
    /// Transport used by both clients.
    pub transport: Arc<dyn HttpTransport>,
    /// Client settings.
    pub settings: FetchSettings,
}

impl FetchContext {
    /// Creates a context with the default `reqwest` transport.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_settings(FetchSettings::default())
    }

    /// Creates a context with custom settings and the default transport.
    pub fn with_settings(settings: FetchSettings) -> Result<Self, HttpError> {
        Self::builder().settings(settings).build()
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> FetchContextBuilder {
        FetchContextBuilder::new()
    }

    /// The OData collection client.
    pub fn odata(&self) -> CollectionClient {
        CollectionClient::new(self.transport.clone())
    }

    /// The GitHub repository client.
    pub fn github(&self) -> RepositoryClient {
        RepositoryClient::new(self.transport.clone())
            .with_api_base(self.settings.github_api_base.clone())
    }
}

impl std::fmt::Debug for FetchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Fetch Context Builder
// ============================================================================

/// Builder for constructing a [`FetchContext`].
#[derive(Default)]
pub struct FetchContextBuilder {
    transport: Option<Arc<dyn HttpTransport>>,
    settings: FetchSettings,
}

impl FetchContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the transport. Without one, an allowlisted [`HttpClient`] is built.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the settings.
    pub fn settings(mut self, settings: FetchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.settings.timeout = timeout;
        self
    }

    /// Sets the GitHub API base.
    pub fn github_api_base(mut self, base: impl Into<String>) -> Self {
        self.settings.github_api_base = base.into();
        self
    }

    /// Builds the fetch context.
    pub fn build(self) -> Result<FetchContext, HttpError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let domains = self.settings.allowed_domains();
                debug!(?domains, timeout = ?self.settings.timeout, "Building HTTP transport");
                Arc::new(
                    HttpClient::with_timeout(self.settings.timeout)?.with_allowed_domains(domains),
                )
            }
        };

        Ok(FetchContext {
            transport,
            settings: self.settings,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
