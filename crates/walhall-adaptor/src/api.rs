//! Request handling: one Walhall client per inbound request, one client
//! operation per route, result reshaped to the adaptor's public JSON.

use std::sync::Arc;

use bytes::Bytes;
use http::{header, HeaderMap, Method, Response, StatusCode};
use http_body_util::Full;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use walhall_api::{ApiError, Transport, WalhallClient};

use crate::config::AdaptorConfig;
use crate::error::ErrorResponse;
use crate::health::HealthChecker;
use crate::routes::Route;

/// A module as exposed on the public surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleResponse {
    /// Module name.
    pub name: String,
    /// Where the module's source lives.
    pub source: String,
    /// One build per published version.
    pub builds: Vec<ModuleBuild>,
}

/// A build of a module as exposed on the public surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleBuild {
    /// Fully qualified image reference.
    pub image: String,
    /// Commit the build was produced from; not tracked by upstream.
    pub commit: String,
    /// Branch the build was produced from; not tracked by upstream.
    pub branch: String,
    /// Tags attached to the build.
    pub tags: Vec<String>,
}

/// Request dispatcher: holds what every request handler needs.
pub struct Gateway<T> {
    config: Arc<AdaptorConfig>,
    transport: T,
    health: Arc<HealthChecker>,
}

impl<T> Gateway<T>
where
    T: Transport + Clone + Send + Sync + 'static,
{
    /// Create a gateway over a shared transport.
    pub fn new(config: Arc<AdaptorConfig>, transport: T, health: Arc<HealthChecker>) -> Self {
        Self {
            config,
            transport,
            health,
        }
    }

    /// Dispatch one request to its handler.
    ///
    /// `path` must not include the query string. Unknown routes answer 404.
    pub async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
        request_id: &str,
    ) -> Response<Full<Bytes>> {
        match Route::matches(method, path) {
            Some(Route::Health) => json_response(StatusCode::OK, &self.health.liveness()),
            Some(Route::Ready) => {
                let readiness = self.health.readiness();
                let status = if self.health.is_ready() {
                    StatusCode::OK
                } else {
                    StatusCode::SERVICE_UNAVAILABLE
                };
                json_response(status, &readiness)
            }
            Some(Route::ListOrgs) => self.list_orgs(headers, request_id).await,
            Some(Route::ListModules { org }) => self.list_modules(&org, headers, request_id).await,
            Some(Route::RefreshModules { org }) => {
                self.refresh_modules(&org, headers, request_id).await
            }
            Some(Route::RefreshModulesStatus { org }) => {
                self.refresh_modules_status(&org, headers, request_id).await
            }
            None => error_response(
                StatusCode::NOT_FOUND,
                &format!("no route for {method} {path}"),
                request_id,
            ),
        }
    }

    /// Build a client for this request from its `authorization` header.
    fn authenticate(
        &self,
        headers: &HeaderMap,
        request_id: &str,
    ) -> Result<WalhallClient<T>, Response<Full<Bytes>>> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        WalhallClient::new(token, self.transport.clone()).map_err(|e| {
            warn!(error = %e, "rejecting request with undecodable token");
            error_response(StatusCode::FORBIDDEN, "Unable to parse JWT", request_id)
        })
    }

    async fn list_orgs(&self, headers: &HeaderMap, request_id: &str) -> Response<Full<Bytes>> {
        let mut client = match self.authenticate(headers, request_id) {
            Ok(client) => client,
            Err(response) => return response,
        };

        match client.list_orgs().await {
            Ok(orgs) => {
                let names: Vec<String> = orgs.into_keys().collect();
                json_response(StatusCode::OK, &names)
            }
            Err(e) => api_error_response(&e, request_id),
        }
    }

    async fn list_modules(
        &self,
        org: &str,
        headers: &HeaderMap,
        request_id: &str,
    ) -> Response<Full<Bytes>> {
        let mut client = match self.authenticate(headers, request_id) {
            Ok(client) => client,
            Err(response) => return response,
        };

        match client.list_modules(org).await {
            Ok(modules) => {
                let registry = &self.config.upstream.registry;
                let modules: Vec<ModuleResponse> = modules
                    .iter()
                    .map(|module| ModuleResponse {
                        name: module.name.clone(),
                        source: "Github".to_string(),
                        builds: module
                            .versions
                            .iter()
                            .map(|version| ModuleBuild {
                                image: format!(
                                    "{registry}/{org}/{}:{}",
                                    module.image, version.version
                                ),
                                commit: "UNKNOWN".to_string(),
                                branch: "UNKNOWN".to_string(),
                                tags: vec![version.version.clone()],
                            })
                            .collect(),
                    })
                    .collect();
                json_response(StatusCode::OK, &modules)
            }
            Err(e) => api_error_response(&e, request_id),
        }
    }

    async fn refresh_modules(
        &self,
        org: &str,
        headers: &HeaderMap,
        request_id: &str,
    ) -> Response<Full<Bytes>> {
        let mut client = match self.authenticate(headers, request_id) {
            Ok(client) => client,
            Err(response) => return response,
        };

        match client.refresh_modules(org).await {
            Ok(status) => json_response(StatusCode::OK, &status),
            Err(e) => api_error_response(&e, request_id),
        }
    }

    async fn refresh_modules_status(
        &self,
        org: &str,
        headers: &HeaderMap,
        request_id: &str,
    ) -> Response<Full<Bytes>> {
        let mut client = match self.authenticate(headers, request_id) {
            Ok(client) => client,
            Err(response) => return response,
        };

        match client.refresh_modules_status(org).await {
            Ok(status) => json_response(StatusCode::OK, &status),
            Err(e) => api_error_response(&e, request_id),
        }
    }
}

/// Map a client error onto the public surface.
///
/// Server-side failures are logged with detail and answered with a generic
/// message; client-addressable failures carry the error text.
fn api_error_response(error: &ApiError, request_id: &str) -> Response<Full<Bytes>> {
    let status = error.status_code();
    if status.is_server_error() {
        error!(error = %error, "upstream operation failed");
        error_response(status, "internal server error", request_id)
    } else {
        info!(error = %error, "request failed");
        error_response(status, &error.to_string(), request_id)
    }
}

/// Create a JSON response.
pub(crate) fn json_response<B: Serialize>(status: StatusCode, body: &B) -> Response<Full<Bytes>> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|_| {
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Full::new(Bytes::from("{}")))
                .unwrap()
        })
}

/// Create a JSON error response.
pub(crate) fn error_response(
    status: StatusCode,
    message: &str,
    request_id: &str,
) -> Response<Full<Bytes>> {
    let body = ErrorResponse::new(
        status.canonical_reason().unwrap_or("error"),
        message,
    )
    .with_request_id(request_id);

    json_response(status, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_response_sets_content_type() {
        let response = json_response(StatusCode::OK, &serde_json::json!({"key": "value"}));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_error_response_carries_request_id() {
        let response = error_response(StatusCode::NOT_FOUND, "no such route", "req-42");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_module_response_shape() {
        let module = ModuleResponse {
            name: "eve-demo".to_string(),
            source: "Github".to_string(),
            builds: vec![ModuleBuild {
                image: "registry.walhall.io/corporate-org/eve-demo:0.0.3".to_string(),
                commit: "UNKNOWN".to_string(),
                branch: "UNKNOWN".to_string(),
                tags: vec!["0.0.3".to_string()],
            }],
        };

        let json = serde_json::to_value(&module).unwrap();
        assert_eq!(json["source"], "Github");
        assert_eq!(json["builds"][0]["commit"], "UNKNOWN");
        assert_eq!(json["builds"][0]["tags"][0], "0.0.3");
    }
}
