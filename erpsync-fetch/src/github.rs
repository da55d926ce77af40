//! GitHub repository client.
//!
//! Covers the handful of REST endpoints erpsync needs: the signed-in user,
//! repositories with push access, and reading and writing single files
//! through the contents API.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use erpsync_core::{ValidationError, validate_branch, validate_repo_identifier, validate_repo_path};
use reqwest::header::{ACCEPT, HeaderName};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::FetchError;
use crate::host::http::{HttpRequest, HttpResponse, HttpTransport};

// ============================================================================
// Constants
// ============================================================================

/// Public GitHub REST API.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Page size for `/user/repos`.
const REPOS_PER_PAGE: usize = 100;

/// Most pages read from `/user/repos`.
const MAX_REPO_PAGES: usize = 10;

const API_VERSION: HeaderName = HeaderName::from_static("x-github-api-version");

// ============================================================================
// Response Types
// ============================================================================

/// Permissions the token holds on a repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryPermissions {
    /// Admin access.
    #[serde(default)]
    pub admin: bool,
    /// Write access.
    #[serde(default)]
    pub push: bool,
    /// Read access.
    #[serde(default)]
    pub pull: bool,
}

/// Repository metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    /// `owner/name`.
    pub full_name: String,
    /// Default branch.
    #[serde(default)]
    pub default_branch: Option<String>,
    /// Whether the repository is private.
    #[serde(default)]
    pub private: bool,
    /// Permissions, absent for unauthenticated calls.
    #[serde(default)]
    pub permissions: Option<RepositoryPermissions>,
}

impl RepositoryInfo {
    /// True when the token may push.
    pub fn can_push(&self) -> bool {
        self.permissions.is_some_and(|p| p.push)
    }
}

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
    /// Login name.
    pub login: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// An existing file in a repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileHandle {
    /// Blob sha, required to overwrite the file.
    pub sha: String,
    /// Path inside the repository.
    pub path: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
}

/// Outcome of a file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Path that was written.
    pub path: String,
    /// Sha of the commit that wrote it.
    pub commit_sha: Option<String>,
    /// Blob sha of the new content.
    pub content_sha: Option<String>,
    /// True when an existing file was replaced.
    pub replaced: bool,
}

#[derive(Debug, Deserialize)]
struct ContentsWriteResponse {
    #[serde(default)]
    content: Option<ContentRef>,
    #[serde(default)]
    commit: Option<CommitRef>,
}

#[derive(Debug, Deserialize)]
struct ContentRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    sha: String,
}

/// Body of `PUT /repos/{o}/{r}/contents/{path}`.
#[derive(Debug, Serialize)]
struct ContentsWriteRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

// ============================================================================
// Repository Client
// ============================================================================

/// Client for the GitHub REST API.
#[derive(Clone)]
pub struct RepositoryClient {
    transport: Arc<dyn HttpTransport>,
    api_base: String,
}

impl RepositoryClient {
    /// Creates a client against the public API.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Points the client at another API base, e.g. an enterprise server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// The API base in use.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn request(&self, request: HttpRequest, token: &str) -> Result<HttpRequest, FetchError> {
        Ok(request
            .bearer(token)?
            .header(ACCEPT, "application/vnd.github+json")?
            .header(API_VERSION, "2022-11-28")?)
    }

    async fn get(&self, url: String, token: &str) -> Result<HttpResponse, FetchError> {
        let request = self.request(HttpRequest::get(url), token)?;
        Ok(self.transport.execute(request).await?)
    }

    fn repo_url(&self, owner: &str, repo: &str) -> Result<String, ValidationError> {
        validate_repo_identifier(owner)?;
        validate_repo_identifier(repo)?;
        Ok(format!("{}/repos/{owner}/{repo}", self.api_base))
    }

    fn contents_url(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<String, ValidationError> {
        let repo_url = self.repo_url(owner, repo)?;
        validate_repo_path(path)?;
        Ok(format!("{repo_url}/contents/{path}"))
    }

    /// Returns the authenticated user.
    #[instrument(skip(self, token))]
    pub async fn current_user(&self, token: &str) -> Result<GitHubUser, FetchError> {
        let response = self.get(format!("{}/user", self.api_base), token).await?;
        if !response.is_success() {
            return Err(FetchError::from_response(&response, "user"));
        }
        Ok(response.json()?)
    }

    /// Checks that the repository exists and the token can push to it.
    #[instrument(skip(self, token))]
    pub async fn verify_access(
        &self,
        owner: &str,
        repo: &str,
        token: &str,
    ) -> Result<RepositoryInfo, FetchError> {
        let url = self.repo_url(owner, repo)?;
        let response = self.get(url, token).await?;
        if !response.is_success() {
            return Err(FetchError::from_response(
                &response,
                &format!("repository {owner}/{repo}"),
            ));
        }

        let info: RepositoryInfo = response.json()?;
        if !info.can_push() {
            return Err(FetchError::AccessDenied(format!(
                "no push permission on {}",
                info.full_name
            )));
        }

        debug!(repo = %info.full_name, "Push access confirmed");
        Ok(info)
    }

    /// Lists repositories the token can push to.
    #[instrument(skip(self, token))]
    pub async fn list_writable_repositories(
        &self,
        token: &str,
    ) -> Result<Vec<RepositoryInfo>, FetchError> {
        let mut writable = Vec::new();

        for page in 1..=MAX_REPO_PAGES {
            let url = format!(
                "{}/user/repos?per_page={REPOS_PER_PAGE}&page={page}&sort=updated",
                self.api_base
            );
            let response = self.get(url, token).await?;
            if !response.is_success() {
                return Err(FetchError::from_response(&response, "repositories"));
            }

            let repos: Vec<RepositoryInfo> = response.json()?;
            let last_page = repos.len() < REPOS_PER_PAGE;
            writable.extend(repos.into_iter().filter(RepositoryInfo::can_push));

            if last_page {
                break;
            }
        }

        debug!(count = writable.len(), "Writable repositories listed");
        Ok(writable)
    }

    /// Reads a file's handle. Returns `None` only when the file does not exist.
    #[instrument(skip(self, token))]
    pub async fn read_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        token: &str,
        branch: &str,
    ) -> Result<Option<FileHandle>, FetchError> {
        let url = self.contents_url(owner, repo, path)?;
        validate_branch(branch)?;

        let response = self.get(format!("{url}?ref={branch}"), token).await?;
        if response.status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(FetchError::from_response(&response, path));
        }

        let handle: FileHandle = response
            .json()
            .map_err(|_| FetchError::InvalidResponse(format!("{path} is not a file")))?;
        Ok(Some(handle))
    }

    /// Creates or replaces a file.
    ///
    /// Reads the current handle first and includes its sha only when the
    /// file already exists. A concurrent writer between the read and the
    /// write makes the PUT fail with a conflict.
    #[allow(clippy::too_many_arguments)]
    #[instrument(skip(self, content, token), fields(bytes = content.len()))]
    pub async fn write_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        content: &str,
        message: &str,
        token: &str,
        branch: &str,
    ) -> Result<CommitInfo, FetchError> {
        let url = self.contents_url(owner, repo, path)?;
        validate_branch(branch)?;

        let existing = self.read_file(owner, repo, path, token, branch).await?;

        let body = ContentsWriteRequest {
            message,
            content: BASE64.encode(content.as_bytes()),
            branch,
            sha: existing.as_ref().map(|h| h.sha.as_str()),
        };
        let request = self.request(HttpRequest::put(url).json(&body)?, token)?;

        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(FetchError::from_response(&response, path));
        }

        let written: ContentsWriteResponse = response.json()?;
        let info = CommitInfo {
            path: path.to_string(),
            commit_sha: written.commit.map(|c| c.sha),
            content_sha: written.content.map(|c| c.sha),
            replaced: existing.is_some(),
        };

        info!(path = %path, replaced = info.replaced, "File committed");
        Ok(info)
    }
}

impl std::fmt::Debug for RepositoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::mock::{MockTransport, json_response, text_response};
    use reqwest::Method;
    use serde_json::{Value, json};

    const API: &str = "https://api.github.com";

    fn client(transport: &Arc<MockTransport>) -> RepositoryClient {
        RepositoryClient::new(transport.clone())
    }

    fn put_body(transport: &MockTransport) -> Value {
        let put = transport
            .requests()
            .into_iter()
            .find(|r| r.method == Method::PUT)
            .unwrap();
        serde_json::from_str(put.body.as_deref().unwrap()).unwrap()
    }

    fn written() -> Result<HttpResponse, crate::error::HttpError> {
        json_response(201, &json!({
            "content": {"sha": "newblob", "path": "exports/a.json"},
            "commit": {"sha": "c0ffee"}
        }))
    }

    #[tokio::test]
    async fn test_write_file_includes_sha_when_file_exists() {
        let transport = Arc::new(MockTransport::new(|req| {
            if req.method == Method::GET {
                json_response(200, &json!({"sha": "H", "path": "exports/a.json", "size": 10}))
            } else {
                written()
            }
        }));

        let info = client(&transport)
            .write_file("acme", "data", "exports/a.json", "hello", "msg", "tok", "main")
            .await
            .unwrap();

        assert!(info.replaced);
        assert_eq!(info.commit_sha.as_deref(), Some("c0ffee"));

        let body = put_body(&transport);
        assert_eq!(body["sha"], "H");
        assert_eq!(body["content"], "aGVsbG8=");
        assert_eq!(body["branch"], "main");
        assert_eq!(body["message"], "msg");

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0].url,
            format!("{API}/repos/acme/data/contents/exports/a.json?ref=main")
        );
        assert_eq!(
            requests[1].url,
            format!("{API}/repos/acme/data/contents/exports/a.json")
        );
    }

    #[tokio::test]
    async fn test_write_file_omits_sha_when_missing() {
        let transport = Arc::new(MockTransport::new(|req| {
            if req.method == Method::GET {
                text_response(404, r#"{"message":"Not Found"}"#)
            } else {
                written()
            }
        }));

        let info = client(&transport)
            .write_file("acme", "data", "exports/a.json", "hello", "msg", "tok", "main")
            .await
            .unwrap();

        assert!(!info.replaced);
        let body = put_body(&transport);
        assert!(body.get("sha").is_none());
    }

    #[tokio::test]
    async fn test_write_file_propagates_read_failure() {
        let transport = Arc::new(MockTransport::new(|_| {
            text_response(500, r#"{"message":"Server Error"}"#)
        }));

        let err = client(&transport)
            .write_file("acme", "data", "exports/a.json", "x", "msg", "tok", "main")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 500, .. }));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_write_file_conflict_is_error() {
        let transport = Arc::new(MockTransport::new(|req| {
            if req.method == Method::GET {
                json_response(200, &json!({"sha": "H", "path": "a.json"}))
            } else {
                text_response(409, r#"{"message":"a.json does not match H"}"#)
            }
        }));

        let err = client(&transport)
            .write_file("acme", "data", "a.json", "x", "msg", "tok", "main")
            .await
            .unwrap_err();

        match err {
            FetchError::Status { status, message } => {
                assert_eq!(status, 409);
                assert!(message.contains("does not match"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_identifiers_make_no_request() {
        let transport = Arc::new(MockTransport::new(|_| written()));
        let c = client(&transport);

        let cases = [
            ("acme", "data", "../secrets.json", "main"),
            ("acme", "data", "/abs.json", "main"),
            ("acme", "data", "exports//a.json", "main"),
            ("acme", "data", "exports/a b.json", "main"),
            ("ac/me", "data", "a.json", "main"),
            ("acme", "..", "a.json", "main"),
            ("acme", "data", "a.json", "main?x=1"),
            ("acme", "data", "a.json", "../main"),
        ];

        for (owner, repo, path, branch) in cases {
            let err = c
                .write_file(owner, repo, path, "x", "msg", "tok", branch)
                .await
                .unwrap_err();
            assert!(err.is_validation(), "expected validation error for {path:?}");
        }
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_read_file_not_found_is_none() {
        let transport = Arc::new(MockTransport::new(|_| text_response(404, "")));

        let handle = client(&transport)
            .read_file("acme", "data", "a.json", "tok", "main")
            .await
            .unwrap();

        assert!(handle.is_none());
    }

    #[tokio::test]
    async fn test_read_file_directory_is_invalid_response() {
        let transport = Arc::new(MockTransport::new(|_| {
            json_response(200, &json!([{"sha": "x", "path": "exports/a.json"}]))
        }));

        let err = client(&transport)
            .read_file("acme", "data", "exports", "tok", "main")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_verify_access_requires_push() {
        let transport = Arc::new(MockTransport::new(|_| {
            json_response(200, &json!({
                "full_name": "acme/data",
                "default_branch": "main",
                "permissions": {"admin": false, "push": false, "pull": true}
            }))
        }));

        let err = client(&transport)
            .verify_access("acme", "data", "tok")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::AccessDenied(_)));
    }

    #[tokio::test]
    async fn test_verify_access_ok_and_not_found() {
        let ok = Arc::new(MockTransport::new(|_| {
            json_response(200, &json!({
                "full_name": "acme/data",
                "permissions": {"push": true}
            }))
        }));
        let info = client(&ok).verify_access("acme", "data", "tok").await.unwrap();
        assert_eq!(info.full_name, "acme/data");

        let missing = Arc::new(MockTransport::new(|_| text_response(404, "")));
        let err = client(&missing)
            .verify_access("acme", "data", "tok")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_writable_repositories_pages_and_filters() {
        let transport = Arc::new(MockTransport::new(|req| {
            let repos: Vec<Value> = if req.url.contains("page=1&") {
                (0..100)
                    .map(|i| json!({"full_name": format!("acme/r{i}"), "permissions": {"push": i % 2 == 0}}))
                    .collect()
            } else {
                vec![json!({"full_name": "acme/last", "permissions": {"push": true}})]
            };
            json_response(200, &Value::Array(repos))
        }));

        let repos = client(&transport)
            .list_writable_repositories("tok")
            .await
            .unwrap();

        assert_eq!(transport.request_count(), 2);
        assert_eq!(repos.len(), 51);
        assert_eq!(repos.last().unwrap().full_name, "acme/last");
    }

    #[tokio::test]
    async fn test_current_user_and_custom_base() {
        let transport = Arc::new(MockTransport::new(|_| {
            json_response(200, &json!({"login": "octocat", "name": "Mona"}))
        }));

        let user = RepositoryClient::new(transport.clone())
            .with_api_base("https://github.example.com/api/v3/")
            .current_user("tok")
            .await
            .unwrap();

        assert_eq!(user.login, "octocat");
        assert_eq!(
            transport.requests()[0].url,
            "https://github.example.com/api/v3/user"
        );
        assert_eq!(
            transport.requests()[0].header_str("x-github-api-version"),
            Some("2022-11-28")
        );
    }

    #[tokio::test]
    async fn test_rate_limit_detected() {
        let transport = Arc::new(MockTransport::new(|_| {
            let mut response = HttpResponse::new(reqwest::StatusCode::FORBIDDEN, "{}");
            response.headers.insert(
                "x-ratelimit-remaining",
                reqwest::header::HeaderValue::from_static("0"),
            );
            Ok(response)
        }));

        let err = client(&transport).current_user("tok").await.unwrap_err();
        assert!(matches!(err, FetchError::RateLimited { .. }));
    }
}
