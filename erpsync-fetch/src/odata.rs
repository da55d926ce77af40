//! OData collection client.
//!
//! Talks to the `/data` endpoint of a Dynamics 365 finance and operations
//! environment: record counts, cursor-paginated entity sets, and the
//! service document listing the available entity sets.

use std::sync::Arc;

use erpsync_core::{
    PageProgress, Record, ValidationError, is_valid_resource_name, sanitize_resource_name,
};
use reqwest::header::{ACCEPT, HeaderName};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::FetchError;
use crate::host::http::{HttpRequest, HttpTransport};

// ============================================================================
// Constants
// ============================================================================

/// Hostname suffixes a base URL must end with.
pub const ALLOWED_HOST_SUFFIXES: &[&str] = &[
    ".operations.dynamics.com",
    ".sandbox.operations.dynamics.com",
    ".cloudax.dynamics.com",
    ".sandbox.ax.dynamics.com",
    ".operations.dynamics.cn",
    ".operations.microsoftdynamics.us",
];

/// Hard ceiling on page requests per resource.
pub const MAX_PAGES: usize = 100;

/// Path segment of the OData root below the environment URL.
const DATA_SEGMENT: &str = "data";

const ODATA_VERSION: HeaderName = HeaderName::from_static("odata-version");
const ODATA_MAX_VERSION: HeaderName = HeaderName::from_static("odata-maxversion");
const PREFER: HeaderName = HeaderName::from_static("prefer");

// ============================================================================
// Host Validation
// ============================================================================

/// Validates and normalizes an environment base URL.
///
/// Accepts only hosts ending in one of [`ALLOWED_HOST_SUFFIXES`]. A missing
/// scheme is treated as `https`, `http` is upgraded, and query, fragment,
/// a trailing `/data` segment, and trailing slashes are stripped. Returns
/// `None` on any parse failure or disallowed host.
pub fn validate_host(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let mut parsed = Url::parse(&candidate).ok()?;
    match parsed.scheme() {
        "https" => {}
        "http" => parsed.set_scheme("https").ok()?,
        _ => return None,
    }

    if !parsed.username().is_empty() || parsed.password().is_some() {
        return None;
    }

    let host = parsed.host_str()?.to_ascii_lowercase();
    if !ALLOWED_HOST_SUFFIXES.iter().any(|suffix| host.ends_with(suffix)) {
        return None;
    }

    parsed.set_query(None);
    parsed.set_fragment(None);

    let mut normalized = parsed.as_str().trim_end_matches('/').to_string();
    if let Some(stripped) = normalized.strip_suffix(&format!("/{DATA_SEGMENT}")) {
        normalized = stripped.to_string();
    }
    Some(normalized)
}

/// Re-validates a base URL handed to a client method.
fn checked_base(base_url: &str) -> Result<(String, Url), ValidationError> {
    let base = validate_host(base_url).ok_or_else(|| ValidationError::Host(base_url.to_string()))?;
    let parsed = Url::parse(&base).map_err(|_| ValidationError::Host(base_url.to_string()))?;
    Ok((base, parsed))
}

/// Resolves a server-provided continuation link.
///
/// Links that do not parse, or that leave the validated host, end pagination.
fn resolve_next_link(link: &str, base: &Url) -> Option<String> {
    let resolved = base.join(link).ok()?;
    if resolved.scheme() != "https" || resolved.host_str() != base.host_str() {
        return None;
    }
    Some(resolved.into())
}

// ============================================================================
// Response Types
// ============================================================================

/// One page of an entity set.
#[derive(Debug, Deserialize)]
struct ODataPage {
    #[serde(default)]
    value: Vec<Record>,
    #[serde(rename = "@odata.nextLink", default)]
    next_link: Option<String>,
}

/// The OData service document.
#[derive(Debug, Deserialize)]
struct ServiceDocument {
    #[serde(default)]
    value: Vec<ServiceEntry>,
}

#[derive(Debug, Deserialize)]
struct ServiceEntry {
    name: String,
    #[serde(default)]
    kind: Option<String>,
}

// ============================================================================
// Fetch Options
// ============================================================================

/// Options for [`CollectionClient::fetch_records`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Stop once this many records are held. `None` or `0` means no cap.
    pub max_records: Option<usize>,
    /// Sent as `Prefer: odata.maxpagesize=N`.
    pub page_size: Option<u32>,
}

impl FetchOptions {
    /// Sets the record cap.
    pub fn with_max_records(mut self, max: Option<usize>) -> Self {
        self.max_records = max;
        self
    }

    /// Sets the page-size hint.
    pub fn with_page_size(mut self, size: Option<u32>) -> Self {
        self.page_size = size;
        self
    }

    fn cap(&self) -> Option<usize> {
        self.max_records.filter(|max| *max > 0)
    }
}

// ============================================================================
// Collection Client
// ============================================================================

/// Client for the OData collection service.
#[derive(Clone)]
pub struct CollectionClient {
    transport: Arc<dyn HttpTransport>,
}

impl CollectionClient {
    /// Creates a client over the given transport.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Builds a request with the OData headers.
    fn request(
        url: &str,
        token: &str,
        accept: &str,
        page_size: Option<u32>,
    ) -> Result<HttpRequest, FetchError> {
        let mut request = HttpRequest::get(url)
            .bearer(token)?
            .header(ACCEPT, accept)?
            .header(ODATA_VERSION, "4.0")?
            .header(ODATA_MAX_VERSION, "4.0")?;
        if let Some(size) = page_size {
            request = request.header(PREFER, &format!("odata.maxpagesize={size}"))?;
        }
        Ok(request)
    }

    /// Fetches the record count of one resource.
    ///
    /// Returns `Ok(None)` on any failed request, non-success status, or
    /// non-numeric body. Only an invalid base URL or resource name is an
    /// error, and that is raised before any request is made.
    #[instrument(skip(self, token))]
    pub async fn fetch_count(
        &self,
        base_url: &str,
        resource: &str,
        token: &str,
    ) -> Result<Option<u64>, FetchError> {
        let name = sanitize_resource_name(resource)?;
        let (base, _) = checked_base(base_url)?;
        let url = format!("{base}/{DATA_SEGMENT}/{name}/$count");
        let request = Self::request(&url, token, "text/plain", None)?;

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(resource = %name, error = %e, "Count request failed");
                return Ok(None);
            }
        };

        if !response.is_success() {
            debug!(resource = %name, status = %response.status, "Count unavailable");
            return Ok(None);
        }

        Ok(parse_count(&response.body))
    }

    /// Drains every page of a resource into memory.
    ///
    /// Follows `@odata.nextLink` until it is absent, the record cap is met,
    /// or [`MAX_PAGES`] requests have been made. `on_page` is called once
    /// per page, in order, after the page has been appended.
    #[instrument(skip(self, token, on_page), fields(max_records = ?options.max_records))]
    pub async fn fetch_records<F>(
        &self,
        base_url: &str,
        resource: &str,
        token: &str,
        options: FetchOptions,
        mut on_page: F,
    ) -> Result<Vec<Record>, FetchError>
    where
        F: FnMut(PageProgress) + Send,
    {
        let name = sanitize_resource_name(resource)?;
        let (base, base_url_parsed) = checked_base(base_url)?;
        let cap = options.cap();

        let mut records: Vec<Record> = Vec::new();
        let mut next_url = Some(format!("{base}/{DATA_SEGMENT}/{name}"));
        let mut page_index = 0;

        while let Some(url) = next_url.take() {
            if page_index >= MAX_PAGES {
                warn!(
                    resource = %name,
                    pages = page_index,
                    records = records.len(),
                    "Page ceiling reached, returning accumulated records"
                );
                break;
            }

            let request = Self::request(&url, token, "application/json", options.page_size)?;
            let response = self.transport.execute(request).await?;
            if !response.is_success() {
                return Err(FetchError::from_response(
                    &response,
                    &format!("resource {name}"),
                ));
            }

            let page: ODataPage = response.json()?;
            debug!(resource = %name, page = page_index, rows = page.value.len(), "Page received");
            records.extend(page.value);

            let cap_reached = match cap {
                Some(max) if records.len() >= max => {
                    records.truncate(max);
                    true
                }
                _ => false,
            };

            on_page(PageProgress {
                page_index,
                accumulated: records.len(),
            });
            page_index += 1;

            if cap_reached {
                debug!(resource = %name, cap = ?cap, "Record cap reached");
                break;
            }

            if let Some(link) = page.next_link {
                next_url = resolve_next_link(&link, &base_url_parsed);
                if next_url.is_none() {
                    warn!(resource = %name, link = %link, "Ignoring continuation link outside base host");
                }
            }
        }

        info!(resource = %name, pages = page_index, records = records.len(), "Fetch complete");
        Ok(records)
    }

    /// Lists entity sets from the service document.
    ///
    /// Names that do not pass the resource-name rule are dropped.
    #[instrument(skip(self, token))]
    pub async fn discover_resources(
        &self,
        base_url: &str,
        token: &str,
    ) -> Result<Vec<String>, FetchError> {
        let (base, _) = checked_base(base_url)?;
        let url = format!("{base}/{DATA_SEGMENT}");
        let request = Self::request(&url, token, "application/json", None)?;

        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(FetchError::from_response(&response, "service document"));
        }

        let document: ServiceDocument = response.json()?;
        let mut names: Vec<String> = document
            .value
            .into_iter()
            .filter(|entry| entry.kind.as_deref().is_none_or(|k| k == "EntitySet"))
            .map(|entry| entry.name)
            .filter(|name| is_valid_resource_name(name))
            .collect();
        names.sort();
        names.dedup();

        debug!(count = names.len(), "Discovered entity sets");
        Ok(names)
    }
}

impl std::fmt::Debug for CollectionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionClient").finish_non_exhaustive()
    }
}

/// Parses a plain-text count body.
fn parse_count(body: &str) -> Option<u64> {
    body.trim_start_matches('\u{feff}').trim().parse().ok()
}

// ============================================================================
// Tests
// ============================================================================
