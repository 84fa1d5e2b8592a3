//! Test utilities for the Walhall API adaptor.
//!
//! Provides [`FakeTransport`], an in-memory implementation of the upstream
//! transport capability, so both the client layer and the gateway can be
//! exercised without a network: canned responses are registered per
//! `METHOD path` key and every executed request is recorded for call-count
//! and body assertions.
//!
//! # Example
//!
//! ```rust
//! use http::{Method, StatusCode};
//! use walhall_test::{fixtures, FakeTransport};
//! use walhall_api::WalhallClient;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let transport = FakeTransport::new();
//! transport.respond(
//!     Method::GET,
//!     "/api/walhalluser/0b618579-f546-4338-9ece-a1c981f90c80",
//!     StatusCode::OK,
//!     fixtures::USER,
//! );
//!
//! let mut client = WalhallClient::new(fixtures::EXAMPLE_TOKEN, transport.clone()).unwrap();
//! let orgs = client.list_orgs().await.unwrap();
//! assert_eq!(orgs["corporate-org"], "f33f013e-e532-4b27-958e-50220a18a2bd");
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/walhall-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};
use parking_lot::Mutex;

use walhall_api::{Transport, TransportError, UpstreamRequest, UpstreamResponse};

pub mod fixtures;

/// A request observed by a [`FakeTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: Method,
    /// Upstream-relative path including query string.
    pub path: String,
    /// The `authorization` header value the client attached.
    pub token: String,
    /// Request body, if any.
    pub body: Option<Bytes>,
}

#[derive(Debug)]
enum Canned {
    Response { status: StatusCode, body: Bytes },
    Failure(String),
}

#[derive(Debug, Default)]
struct Inner {
    responses: HashMap<String, VecDeque<Canned>>,
    requests: Vec<RecordedRequest>,
}

/// In-memory upstream transport with canned responses.
///
/// Responses are keyed by `METHOD path` and consumed FIFO, so registering
/// the same key twice queues a second response for the second call. A
/// request with no registered response fails with a transport error naming
/// the unmatched key, which makes unexpected upstream calls fail the test.
///
/// Clones share the same state, so a clone handed to a client under test can
/// still be inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct FakeTransport {
    inner: Arc<Mutex<Inner>>,
}

impl FakeTransport {
    /// Create a transport with no canned responses.
    pub fn new() -> Self {
        Self::default()
    }

    fn key(method: &Method, path: &str) -> String {
        format!("{method} {path}")
    }

    /// Queue a canned response for `METHOD path`.
    pub fn respond(
        &self,
        method: Method,
        path: &str,
        status: StatusCode,
        body: impl Into<Bytes>,
    ) {
        self.inner
            .lock()
            .responses
            .entry(Self::key(&method, path))
            .or_default()
            .push_back(Canned::Response {
                status,
                body: body.into(),
            });
    }

    /// Queue a transport-level failure for `METHOD path`.
    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.inner
            .lock()
            .responses
            .entry(Self::key(&method, path))
            .or_default()
            .push_back(Canned::Failure(message.to_string()));
    }

    /// All requests executed so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().requests.clone()
    }

    /// Number of executed requests matching `METHOD path`.
    pub fn calls(&self, method: &Method, path: &str) -> usize {
        let key = Self::key(method, path);
        self.inner
            .lock()
            .requests
            .iter()
            .filter(|r| Self::key(&r.method, &r.path) == key)
            .count()
    }

    /// Total number of executed requests.
    pub fn total_calls(&self) -> usize {
        self.inner.lock().requests.len()
    }
}

impl Transport for FakeTransport {
    fn execute(
        &self,
        request: UpstreamRequest,
    ) -> impl Future<Output = Result<UpstreamResponse, TransportError>> + Send {
        let result = {
            let mut inner = self.inner.lock();
            inner.requests.push(RecordedRequest {
                method: request.method().clone(),
                path: request.path().to_string(),
                token: request.token().to_string(),
                body: request.body().cloned(),
            });

            let key = Self::key(request.method(), request.path());
            match inner.responses.get_mut(&key).and_then(VecDeque::pop_front) {
                Some(Canned::Response { status, body }) => Ok(UpstreamResponse::new(status, body)),
                Some(Canned::Failure(message)) => Err(TransportError::new(message)),
                None => Err(TransportError::new(format!(
                    "no canned response for {key}, not previously registered"
                ))),
            }
        };
        async move { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, path: &str) -> UpstreamRequest {
        UpstreamRequest::new(method, path).with_token("JWT test")
    }

    #[tokio::test]
    async fn test_canned_response() {
        let transport = FakeTransport::new();
        transport.respond(Method::GET, "/api/thing", StatusCode::OK, r#"{"a":1}"#);

        let response = transport
            .execute(request(Method::GET, "/api/thing"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), br#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_responses_consumed_in_order() {
        let transport = FakeTransport::new();
        transport.respond(Method::GET, "/x", StatusCode::OK, "first");
        transport.respond(Method::GET, "/x", StatusCode::ACCEPTED, "second");

        let first = transport.execute(request(Method::GET, "/x")).await.unwrap();
        let second = transport.execute(request(Method::GET, "/x")).await.unwrap();
        assert_eq!(first.body().as_ref(), b"first");
        assert_eq!(second.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_unregistered_request_fails() {
        let transport = FakeTransport::new();
        let err = transport
            .execute(request(Method::GET, "/nowhere"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("GET /nowhere"));
    }

    #[tokio::test]
    async fn test_records_requests_and_counts_calls() {
        let transport = FakeTransport::new();
        transport.respond(Method::GET, "/a", StatusCode::OK, "{}");
        transport.respond(Method::GET, "/a", StatusCode::OK, "{}");

        let _ = transport.execute(request(Method::GET, "/a")).await;
        let _ = transport.execute(request(Method::GET, "/a")).await;
        let _ = transport.execute(request(Method::POST, "/b")).await;

        assert_eq!(transport.calls(&Method::GET, "/a"), 2);
        assert_eq!(transport.calls(&Method::POST, "/b"), 1);
        assert_eq!(transport.total_calls(), 3);
        assert_eq!(transport.requests()[0].token, "JWT test");
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let transport = FakeTransport::new();
        transport.respond(Method::GET, "/a", StatusCode::OK, "{}");

        let clone = transport.clone();
        let _ = clone.execute(request(Method::GET, "/a")).await;

        assert_eq!(transport.calls(&Method::GET, "/a"), 1);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let transport = FakeTransport::new();
        transport.fail(Method::GET, "/a", "connection refused");

        let err = transport
            .execute(request(Method::GET, "/a"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
