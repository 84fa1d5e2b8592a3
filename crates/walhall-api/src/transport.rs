//! Transport boundary between the client and Walhall Core.
//!
//! The client never talks to the network directly; it hands
//! [`UpstreamRequest`] values to an injected [`Transport`] capability and
//! gets raw status + body back. Production uses [`HttpTransport`] (reqwest);
//! tests inject an in-memory fake.

use std::future::Future;

use bytes::Bytes;
use http::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::TransportError;

/// Capability for executing requests against Walhall Core.
///
/// Implementations attach the bearer token carried by the request and, when
/// a body is present, a JSON content type. Transport failures surface as
/// [`TransportError`]; they are never retried here.
pub trait Transport: Send + Sync {
    /// Execute one request and return the raw upstream response.
    fn execute(
        &self,
        request: UpstreamRequest,
    ) -> impl Future<Output = Result<UpstreamResponse, TransportError>> + Send;
}

/// A request to be executed against the upstream API.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    method: Method,
    path: String,
    token: String,
    body: Option<Bytes>,
}

impl UpstreamRequest {
    /// Create a request for a path relative to the upstream base address.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            token: String::new(),
            body: None,
        }
    }

    /// Set the `authorization` header value (`JWT <token>`).
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Set a raw request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a JSON-encoded request body.
    pub fn with_json<B: Serialize>(self, body: &B) -> Result<Self, TransportError> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| TransportError::new(format!("encoding request body: {e}")))?;
        Ok(self.with_body(bytes))
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The upstream-relative path, including any query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The `authorization` header value.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The request body, if any.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

/// Raw response from the upstream API.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    status: StatusCode,
    body: Bytes,
}

impl UpstreamResponse {
    /// Create a response from status and body.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The raw response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// HTTP transport backed by a shared reqwest client.
///
/// Prefixes every path with the configured base URL. Deliberately carries no
/// request timeout and no retry: a hung upstream call hangs the owning
/// request, and callers must treat retried mutations as potentially
/// duplicating effects.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the given upstream base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| TransportError::new(format!("failed to create client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// The configured upstream base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn execute(
        &self,
        request: UpstreamRequest,
    ) -> impl Future<Output = Result<UpstreamResponse, TransportError>> + Send {
        async move {
            let url = format!("{}{}", self.base_url, request.path());

            let mut builder = self
                .client
                .request(request.method().clone(), &url)
                .header(header::AUTHORIZATION, request.token());

            if let Some(body) = request.body() {
                builder = builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(body.clone());
            }

            let response = builder.send().await.map_err(TransportError::from)?;
            let status = response.status();
            let body = response.bytes().await.map_err(TransportError::from)?;

            Ok(UpstreamResponse::new(status, body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = UpstreamRequest::new(Method::GET, "/api/orgs")
            .with_token("JWT abc")
            .with_body("payload");

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/api/orgs");
        assert_eq!(request.token(), "JWT abc");
        assert_eq!(request.body().unwrap().as_ref(), b"payload");
    }

    #[test]
    fn test_request_with_json_body() {
        #[derive(Serialize)]
        struct Body<'a> {
            logic_module_version_ids: &'a [i64],
        }

        let request = UpstreamRequest::new(Method::PATCH, "/api/environments/abc")
            .with_json(&Body {
                logic_module_version_ids: &[1, 2, 3],
            })
            .unwrap();

        assert_eq!(
            request.body().unwrap().as_ref(),
            br#"{"logic_module_version_ids":[1,2,3]}"#
        );
    }

    #[test]
    fn test_response_json() {
        let response = UpstreamResponse::new(StatusCode::OK, r#"{"status":"synced"}"#);
        assert!(response.is_success());

        #[derive(serde::Deserialize)]
        struct Status {
            status: String,
        }
        let parsed: Status = response.json().unwrap();
        assert_eq!(parsed.status, "synced");
    }

    #[test]
    fn test_response_json_failure() {
        let response = UpstreamResponse::new(StatusCode::OK, "not json");
        assert!(response.json::<serde_json::Value>().is_err());
    }

    #[test]
    fn test_http_transport_keeps_base_url() {
        let transport = HttpTransport::new("http://api.walhall.io").unwrap();
        assert_eq!(transport.base_url(), "http://api.walhall.io");
    }
}
