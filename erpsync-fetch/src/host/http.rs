//! HTTP transport with tracing and domain allowlist.
//!
//! Clients in this crate never talk to `reqwest` directly. They build an
//! [`HttpRequest`] and hand it to an [`HttpTransport`], which lets tests
//! swap in a scripted transport and count requests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::error::HttpError;

/// User agent string for erpsync.
const USER_AGENT: &str = concat!("erpsync/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Request / Response
// ============================================================================

/// A fully described HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Request headers. The authorization value is marked sensitive.
    pub headers: HeaderMap,
    /// JSON body, already serialized.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Creates a request with no headers or body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Creates a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Creates a PUT request.
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    /// Sets a header.
    pub fn header(mut self, name: HeaderName, value: &str) -> Result<Self, HttpError> {
        let value =
            HeaderValue::from_str(value).map_err(|_| HttpError::InvalidHeader(name.to_string()))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Sets a bearer authorization header.
    pub fn bearer(mut self, token: &str) -> Result<Self, HttpError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| HttpError::InvalidHeader(header::AUTHORIZATION.to_string()))?;
        value.set_sensitive(true);
        self.headers.insert(header::AUTHORIZATION, value);
        Ok(self)
    }

    /// Serializes a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, HttpError> {
        self.body = Some(serde_json::to_string(body)?);
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(self)
    }

    /// Returns a header value as a string, if present.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Body as text.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response with no headers.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Parses the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Get the Retry-After header value in seconds.
    pub fn retry_after_secs(&self) -> Option<u64> {
        self.headers
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }

    /// True when a GitHub-style `x-ratelimit-remaining: 0` header is present.
    pub fn rate_limit_exhausted(&self) -> bool {
        self.headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim() == "0")
    }

    /// Extracts a human-readable error message from a JSON error body.
    ///
    /// Understands the OData shape `{"error":{"message":..}}` and the GitHub
    /// shape `{"message":..}`.
    pub fn error_message(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        value
            .pointer("/error/message")
            .or_else(|| value.get("message"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
    }
}

// ============================================================================
// Transport Trait
// ============================================================================

/// Executes HTTP requests.
///
/// Every network call made by the clients in this crate goes through one
/// `execute` call, so each is a single suspension point.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends the request and buffers the response.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

// ============================================================================
// HTTP Client
// ============================================================================

/// `reqwest`-backed transport with tracing and an optional domain allowlist.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    allowed_domains: Option<Vec<String>>,
}

impl HttpClient {
    /// Creates a client with the transport's default timeout behaviour.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(None)
    }

    /// Creates a client with an optional overall request timeout.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, HttpError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: builder.build()?,
            allowed_domains: None,
        })
    }

    /// Restricts requests to the given domains and their subdomains.
    pub fn with_allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = Some(domains);
        self
    }

    /// Checks if a URL's domain is allowed.
    fn is_domain_allowed(&self, url: &str) -> Result<(), HttpError> {
        let Some(ref allowed) = self.allowed_domains else {
            return Ok(()); // No restrictions
        };

        let parsed = Url::parse(url).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| HttpError::InvalidUrl("No host in URL".to_string()))?;

        let allowed = allowed
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

        if allowed {
            Ok(())
        } else {
            Err(HttpError::DomainNotAllowed(host.to_string()))
        }
    }
}

#[async_trait]
impl HttpTransport for HttpClient {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.is_domain_allowed(&request.url)?;
        debug!("Sending request");

        let mut builder = self
            .inner
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        debug!(status = %status, bytes = body.len(), "Response received");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_allowlist() {
        let client = HttpClient::new().unwrap().with_allowed_domains(vec![
            "api.github.com".to_string(),
            "operations.dynamics.com".to_string(),
        ]);

        assert!(client.is_domain_allowed("https://api.github.com/user").is_ok());
        assert!(
            client
                .is_domain_allowed("https://contoso.operations.dynamics.com/data/Customers")
                .is_ok()
        );

        assert!(client.is_domain_allowed("https://evil.com/steal").is_err());
        assert!(client.is_domain_allowed("https://api.github.com.evil.com/").is_err());
    }

    #[test]
    fn test_no_domain_restrictions() {
        let client = HttpClient::new().unwrap();
        assert!(client.is_domain_allowed("https://any.domain.com").is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let client = HttpClient::new()
            .unwrap()
            .with_allowed_domains(vec!["example.com".to_string()]);
        assert!(client.is_domain_allowed("not-a-valid-url").is_err());
    }

    #[test]
    fn test_bearer_header_is_sensitive() {
        let request = HttpRequest::get("https://api.github.com/user")
            .bearer("secret-token")
            .unwrap();
        let debug = format!("{request:?}");
        assert!(!debug.contains("secret-token"));
        assert_eq!(request.header_str("authorization"), Some("Bearer secret-token"));
    }

    #[test]
    fn test_error_message_shapes() {
        let odata = HttpResponse::new(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":"x","message":"Resource not found for the segment 'Foo'."}}"#,
        );
        assert_eq!(
            odata.error_message().as_deref(),
            Some("Resource not found for the segment 'Foo'.")
        );

        let github = HttpResponse::new(StatusCode::CONFLICT, r#"{"message":"sha does not match"}"#);
        assert_eq!(github.error_message().as_deref(), Some("sha does not match"));

        let plain = HttpResponse::new(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(plain.error_message().is_none());
    }

    #[test]
    fn test_retry_after() {
        let mut response = HttpResponse::new(StatusCode::TOO_MANY_REQUESTS, "");
        response
            .headers
            .insert(header::RETRY_AFTER, HeaderValue::from_static("12"));
        assert_eq!(response.retry_after_secs(), Some(12));
    }
}
