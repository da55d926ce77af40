//! Scripted transport for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::error::HttpError;

type Responder = dyn Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync;

/// Transport that answers every request with a closure and records it.
pub(crate) struct MockTransport {
    responder: Box<Responder>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub(crate) fn new(
        responder: impl Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let response = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        response
    }
}

pub(crate) fn json_response(status: u16, body: &serde_json::Value) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse::new(
        StatusCode::from_u16(status).unwrap(),
        body.to_string(),
    ))
}

pub(crate) fn text_response(status: u16, body: &str) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse::new(StatusCode::from_u16(status).unwrap(), body))
}
