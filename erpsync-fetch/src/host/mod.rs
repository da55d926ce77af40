//! Host APIs for erpsync clients.
//!
//! - [`http`] - HTTP transport trait, request/response types, and the
//!   `reqwest`-backed client with a domain allowlist

pub mod http;
#[cfg(test)]
pub(crate) mod mock;

pub use http::{HttpClient, HttpRequest, HttpResponse, HttpTransport};
