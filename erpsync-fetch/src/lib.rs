// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

//! # erpsync Fetch
//!
//! HTTP transport and the two remote clients used by erpsync.
//!
//! ## Transport
//!
//! - [`host::http::HttpTransport`] - Trait every request goes through
//! - [`host::http::HttpClient`] - `reqwest` implementation with a domain allowlist
//!
//! ## Clients
//!
//! - [`odata::CollectionClient`] - Record counts, paginated entity sets,
//!   and service-document discovery on a finance and operations environment
//! - [`github::RepositoryClient`] - Repository access checks and file
//!   read/write through the contents API
//!
//! ## Auth
//!
//! - [`auth::TokenProvider`] - Silent and interactive token acquisition
//! - [`auth::acquire_token`] - Silent first, interactive on demand
//!
//! ## Example
//!
//! ```ignore
//! use erpsync_fetch::{FetchContext, FetchOptions};
//!
//! let ctx = FetchContext::new()?;
//! let records = ctx
//!     .odata()
//!     .fetch_records(base_url, "CustomersV3", token, FetchOptions::default(), |_| {})
//!     .await?;
//! ```

pub mod auth;
pub mod context;
pub mod error;
pub mod github;
pub mod host;
pub mod odata;

// Errors
pub use error::{AuthError, FetchError, HttpError};

// Transport
pub use host::http::{HttpClient, HttpRequest, HttpResponse, HttpTransport};

// Context
pub use context::{FetchContext, FetchContextBuilder, FetchSettings};

// Clients
pub use github::{
    CommitInfo, DEFAULT_API_BASE, FileHandle, GitHubUser, RepositoryClient, RepositoryInfo,
    RepositoryPermissions,
};
pub use odata::{ALLOWED_HOST_SUFFIXES, CollectionClient, FetchOptions, MAX_PAGES, validate_host};

// Auth
pub use auth::{AccessToken, EnvTokenProvider, TokenProvider, acquire_token};
