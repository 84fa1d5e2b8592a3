//! Route-level tests through the gateway dispatcher with an in-memory
//! upstream.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Method, Response, StatusCode};
use http_body_util::{BodyExt, Full};

use walhall_adaptor::{AdaptorConfig, Gateway, HealthChecker, ModuleResponse};
use walhall_test::{fixtures, FakeTransport};

const USER_PATH: &str = "/api/walhalluser/0b618579-f546-4338-9ece-a1c981f90c80";
const MODULES_PATH: &str =
    "/api/logicmodule?organization=f33f013e-e532-4b27-958e-50220a18a2bd&limit=50&status=internal";

fn gateway(transport: &FakeTransport) -> Gateway<FakeTransport> {
    let config = AdaptorConfig::builder()
        .api_prefix("http://api.walhall.io")
        .registry("registry.walhall.io")
        .build()
        .unwrap();
    let health = Arc::new(HealthChecker::new());
    health.set_ready(true);
    Gateway::new(Arc::new(config), transport.clone(), health)
}

fn auth_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("JWT {}", fixtures::EXAMPLE_TOKEN)).unwrap(),
    );
    headers
}

async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

#[tokio::test]
async fn orgs_route_returns_the_org_name_set() {
    let transport = FakeTransport::new();
    transport.respond(Method::GET, USER_PATH, StatusCode::OK, fixtures::USER);
    let gateway = gateway(&transport);

    let response = gateway
        .dispatch(&Method::GET, "/orgs", &auth_headers(), "req-1")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let names: Vec<String> = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let names: HashSet<String> = names.into_iter().collect();
    let expected: HashSet<String> = ["corporate-org".to_string()].into_iter().collect();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn modules_route_shapes_registry_qualified_builds() {
    let transport = FakeTransport::new();
    transport.respond(Method::GET, USER_PATH, StatusCode::OK, fixtures::USER);
    transport.respond(Method::GET, MODULES_PATH, StatusCode::OK, fixtures::MODULES);
    let gateway = gateway(&transport);

    let response = gateway
        .dispatch(
            &Method::GET,
            "/orgs/corporate-org/modules",
            &auth_headers(),
            "req-1",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let modules: Vec<ModuleResponse> =
        serde_json::from_slice(&body_bytes(response).await).unwrap();

    assert_eq!(modules.len(), 2);
    assert_eq!(modules[0].name, "eve-demo");
    assert_eq!(modules[0].source, "Github");
    assert_eq!(modules[0].builds.len(), 3);
    assert_eq!(
        modules[0].builds[0].image,
        "registry.walhall.io/corporate-org/eve-demo:0.0.3"
    );
    assert_eq!(modules[0].builds[0].commit, "UNKNOWN");
    assert_eq!(modules[0].builds[0].branch, "UNKNOWN");
    assert_eq!(modules[0].builds[0].tags, vec!["0.0.3".to_string()]);
    assert_eq!(modules[1].builds.len(), 1);
    assert_eq!(
        modules[1].builds[0].image,
        "registry.walhall.io/corporate-org/product-be:v1.0"
    );
}

#[tokio::test]
async fn refresh_routes_pass_the_status_through() {
    let sync_path = "/api/repositories/github/sync?organization_uuid=f33f013e-e532-4b27-958e-50220a18a2bd";
    let status_path = "/api/repositories/github/status?organization_uuid=f33f013e-e532-4b27-958e-50220a18a2bd";

    let transport = FakeTransport::new();
    transport.respond(Method::GET, USER_PATH, StatusCode::OK, fixtures::USER);
    transport.respond(Method::POST, sync_path, StatusCode::OK, r#"{"status":"queued"}"#);
    let gateway = gateway(&transport);

    let response = gateway
        .dispatch(
            &Method::POST,
            "/orgs/corporate-org/modules/refresh",
            &auth_headers(),
            "req-1",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let status: String = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(status, "queued");

    // Each dispatch builds a fresh client, so the org listing is re-fetched.
    transport.respond(Method::GET, USER_PATH, StatusCode::OK, fixtures::USER);
    transport.respond(Method::GET, status_path, StatusCode::OK, r#"{"status":"done"}"#);
    let response = gateway
        .dispatch(
            &Method::GET,
            "/orgs/corporate-org/modules/refresh",
            &auth_headers(),
            "req-2",
        )
        .await;
    let status: String = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(status, "done");
}

#[tokio::test]
async fn an_undecodable_token_answers_403() {
    let transport = FakeTransport::new();
    let gateway = gateway(&transport);

    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("garbage"));

    let response = gateway
        .dispatch(&Method::GET, "/orgs", &headers, "req-1")
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_bytes(response).await;
    let envelope: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(envelope["message"], "Unable to parse JWT");
    // Nothing went upstream.
    assert_eq!(transport.total_calls(), 0);
}

#[tokio::test]
async fn a_missing_authorization_header_answers_403() {
    let transport = FakeTransport::new();
    let gateway = gateway(&transport);

    let response = gateway
        .dispatch(&Method::GET, "/orgs", &HeaderMap::new(), "req-1")
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn an_unknown_org_answers_404() {
    let transport = FakeTransport::new();
    transport.respond(Method::GET, USER_PATH, StatusCode::OK, fixtures::USER);
    let gateway = gateway(&transport);

    let response = gateway
        .dispatch(
            &Method::GET,
            "/orgs/org-three/modules",
            &auth_headers(),
            "req-1",
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upstream_failures_answer_500_without_detail() {
    let transport = FakeTransport::new();
    transport.respond(
        Method::GET,
        USER_PATH,
        StatusCode::INTERNAL_SERVER_ERROR,
        "{}",
    );
    let gateway = gateway(&transport);

    let response = gateway
        .dispatch(&Method::GET, "/orgs", &auth_headers(), "req-1")
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let envelope: serde_json::Value =
        serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(envelope["message"], "internal server error");
}

#[tokio::test]
async fn unknown_routes_answer_404() {
    let transport = FakeTransport::new();
    let gateway = gateway(&transport);

    let response = gateway
        .dispatch(&Method::GET, "/nowhere", &HeaderMap::new(), "req-1")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_routes_respond_without_authentication() {
    let transport = FakeTransport::new();
    let gateway = gateway(&transport);

    let response = gateway
        .dispatch(&Method::GET, "/healthz", &HeaderMap::new(), "req-1")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["status"], "healthy");

    let response = gateway
        .dispatch(&Method::GET, "/readyz", &HeaderMap::new(), "req-1")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}
