//! Seams between the orchestrator and the remote clients.
//!
//! The orchestrator only sees [`RecordSource`] and [`FileStore`]. The
//! adapters bind a client to its target (environment URL or repository)
//! and a token.

use async_trait::async_trait;
use erpsync_core::{PageProgress, Record};
use erpsync_fetch::{
    AccessToken, CollectionClient, CommitInfo, FetchError, FetchOptions, RepositoryClient,
};

// ============================================================================
// Traits
// ============================================================================

/// Where records come from.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Drains a resource. `max_records` of `None` means no cap.
    async fn fetch_records(
        &self,
        resource: &str,
        max_records: Option<usize>,
        on_page: &mut (dyn FnMut(PageProgress) + Send),
    ) -> Result<Vec<Record>, FetchError>;

    /// Record count, `None` when the remote cannot say.
    async fn fetch_count(&self, resource: &str) -> Result<Option<u64>, FetchError>;
}

/// Where converted files go.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Creates or replaces one file.
    async fn write_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<CommitInfo, FetchError>;
}

// ============================================================================
// ERP Adapter
// ============================================================================

/// A [`RecordSource`] over one finance and operations environment.
#[derive(Debug, Clone)]
pub struct ErpCollection {
    client: CollectionClient,
    base_url: String,
    token: AccessToken,
    page_size: Option<u32>,
}

impl ErpCollection {
    /// Binds the client to an environment URL and token.
    pub fn new(client: CollectionClient, base_url: impl Into<String>, token: AccessToken) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token,
            page_size: None,
        }
    }

    /// Sets the page-size hint.
    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size;
        self
    }

    /// The environment URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists entity sets from the service document.
    pub async fn discover(&self) -> Result<Vec<String>, FetchError> {
        self.client
            .discover_resources(&self.base_url, self.token.secret())
            .await
    }
}

#[async_trait]
impl RecordSource for ErpCollection {
    async fn fetch_records(
        &self,
        resource: &str,
        max_records: Option<usize>,
        on_page: &mut (dyn FnMut(PageProgress) + Send),
    ) -> Result<Vec<Record>, FetchError> {
        let options = FetchOptions::default()
            .with_max_records(max_records)
            .with_page_size(self.page_size);
        self.client
            .fetch_records(&self.base_url, resource, self.token.secret(), options, on_page)
            .await
    }

    async fn fetch_count(&self, resource: &str) -> Result<Option<u64>, FetchError> {
        self.client
            .fetch_count(&self.base_url, resource, self.token.secret())
            .await
    }
}

// ============================================================================
// GitHub Adapter
// ============================================================================

/// A [`FileStore`] over one branch of one repository.
#[derive(Debug, Clone)]
pub struct GitHubRepository {
    client: RepositoryClient,
    owner: String,
    repo: String,
    branch: String,
    token: AccessToken,
}

impl GitHubRepository {
    /// Binds the client to a repository, branch and token.
    pub fn new(
        client: RepositoryClient,
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
        token: AccessToken,
    ) -> Self {
        Self {
            client,
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            token,
        }
    }

    /// `owner/repo`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// The target branch.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Confirms the repository exists and accepts pushes.
    pub async fn verify(&self) -> Result<erpsync_fetch::RepositoryInfo, FetchError> {
        self.client
            .verify_access(&self.owner, &self.repo, self.token.secret())
            .await
    }
}

#[async_trait]
impl FileStore for GitHubRepository {
    async fn write_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<CommitInfo, FetchError> {
        self.client
            .write_file(
                &self.owner,
                &self.repo,
                path,
                content,
                message,
                self.token.secret(),
                &self.branch,
            )
            .await
    }
}
