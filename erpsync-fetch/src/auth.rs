//! Token acquisition.
//!
//! The sign-in flows themselves live outside this crate. A [`TokenProvider`]
//! exposes a silent attempt (cached session, environment) and an interactive
//! one (prompt), and [`acquire_token`] chains them.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::AuthError;

// ============================================================================
// Access Token
// ============================================================================

/// A bearer token plus the account it belongs to.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// The bearer token. Never logged.
    pub access_token: String,
    /// Human-readable account label, e.g. a login or UPN.
    pub account_label: Option<String>,
}

impl AccessToken {
    /// Creates a token without an account label.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            account_label: None,
        }
    }

    /// Attaches an account label.
    pub fn with_account(mut self, label: impl Into<String>) -> Self {
        self.account_label = Some(label.into());
        self
    }

    /// The token string.
    pub fn secret(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("account_label", &self.account_label)
            .finish()
    }
}

// ============================================================================
// Token Provider
// ============================================================================

/// Source of access tokens for one remote service.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Short service name used in messages.
    fn service(&self) -> &str;

    /// Returns a token without user interaction.
    ///
    /// Fails with [`AuthError::InteractionRequired`] when nothing is cached.
    async fn acquire_silent(&self) -> Result<AccessToken, AuthError>;

    /// Runs the interactive flow.
    async fn acquire_interactive(&self) -> Result<AccessToken, AuthError>;
}

/// Tries the silent flow, then the interactive one if interaction is required.
///
/// Any other silent failure is returned as is.
pub async fn acquire_token(provider: &dyn TokenProvider) -> Result<AccessToken, AuthError> {
    match provider.acquire_silent().await {
        Ok(token) => {
            debug!(service = provider.service(), "Token acquired silently");
            Ok(token)
        }
        Err(AuthError::InteractionRequired(_)) => {
            info!(service = provider.service(), "Interactive sign-in required");
            provider.acquire_interactive().await
        }
        Err(e) => Err(e),
    }
}

// ============================================================================
// Providers
// ============================================================================

/// Reads a token from the first set environment variable.
///
/// Has no interactive flow.
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    service: String,
    vars: Vec<String>,
}

impl EnvTokenProvider {
    /// Creates a provider checking `vars` in order.
    pub fn new(service: impl Into<String>, vars: &[&str]) -> Self {
        Self {
            service: service.into(),
            vars: vars.iter().map(|v| (*v).to_string()).collect(),
        }
    }

    fn lookup(&self, get: impl Fn(&str) -> Option<String>) -> Option<(String, String)> {
        self.vars.iter().find_map(|var| {
            get(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(|value| (var.clone(), value))
        })
    }
}

#[async_trait]
impl TokenProvider for EnvTokenProvider {
    fn service(&self) -> &str {
        &self.service
    }

    async fn acquire_silent(&self) -> Result<AccessToken, AuthError> {
        match self.lookup(|var| std::env::var(var).ok()) {
            Some((var, token)) => {
                debug!(service = %self.service, var = %var, "Using token from environment");
                Ok(AccessToken::new(token))
            }
            None => Err(AuthError::InteractionRequired(self.service.clone())),
        }
    }

    async fn acquire_interactive(&self) -> Result<AccessToken, AuthError> {
        Err(AuthError::Failed(format!(
            "no token for {}; set {}",
            self.service,
            self.vars.join(" or ")
        )))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        silent: Result<AccessToken, AuthError>,
        interactive: Result<AccessToken, AuthError>,
        interactive_calls: AtomicUsize,
    }

    impl Scripted {
        fn new(
            silent: Result<AccessToken, AuthError>,
            interactive: Result<AccessToken, AuthError>,
        ) -> Self {
            Self {
                silent,
                interactive,
                interactive_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TokenProvider for Scripted {
        fn service(&self) -> &str {
            "test"
        }

        async fn acquire_silent(&self) -> Result<AccessToken, AuthError> {
            self.silent.clone()
        }

        async fn acquire_interactive(&self) -> Result<AccessToken, AuthError> {
            self.interactive_calls.fetch_add(1, Ordering::SeqCst);
            self.interactive.clone()
        }
    }

    #[tokio::test]
    async fn test_silent_success_skips_interactive() {
        let provider = Scripted::new(Ok(AccessToken::new("a")), Ok(AccessToken::new("b")));
        let token = acquire_token(&provider).await.unwrap();
        assert_eq!(token.secret(), "a");
        assert_eq!(provider.interactive_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_interaction_required_falls_back() {
        let provider = Scripted::new(
            Err(AuthError::InteractionRequired("test".into())),
            Ok(AccessToken::new("b").with_account("me@contoso.com")),
        );
        let token = acquire_token(&provider).await.unwrap();
        assert_eq!(token.secret(), "b");
        assert_eq!(token.account_label.as_deref(), Some("me@contoso.com"));
    }

    #[tokio::test]
    async fn test_other_silent_errors_do_not_fall_back() {
        let provider = Scripted::new(
            Err(AuthError::Failed("tenant disabled".into())),
            Ok(AccessToken::new("b")),
        );
        let err = acquire_token(&provider).await.unwrap_err();
        assert_eq!(err, AuthError::Failed("tenant disabled".into()));
        assert_eq!(provider.interactive_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancelled_interactive_is_distinct() {
        let provider = Scripted::new(
            Err(AuthError::InteractionRequired("test".into())),
            Err(AuthError::Cancelled("test".into())),
        );
        let err = acquire_token(&provider).await.unwrap_err();
        assert!(matches!(err, AuthError::Cancelled(_)));
    }

    #[test]
    fn test_env_lookup_order_and_blank_values() {
        let provider = EnvTokenProvider::new("github", &["FIRST", "SECOND"]);
        let env = |var: &str| match var {
            "FIRST" => Some("   ".to_string()),
            "SECOND" => Some("tok".to_string()),
            _ => None,
        };
        assert_eq!(
            provider.lookup(env),
            Some(("SECOND".to_string(), "tok".to_string()))
        );
        assert_eq!(provider.lookup(|_| None), None);
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = AccessToken::new("super-secret").with_account("octocat");
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("octocat"));
    }
}
