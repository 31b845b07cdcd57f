#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use dossier_api::auth::jwt::{generate_access_token, JwtConfig};
use dossier_api::config::{ServerConfig, StoreBackend};
use dossier_api::router::build_app_router;
use dossier_api::state::AppState;
use dossier_core::autosave::SyncPolicy;
use dossier_core::promo::TrackPricing;
use dossier_core::roles::{Identity, Role};
use dossier_core::service::DossierService;
use dossier_core::store::MemoryStore;
use dossier_events::EventBus;
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";
pub const TEST_WEBHOOK_SECRET: &str = "test-payment-webhook-secret";

pub const ADMIN_ID: i64 = 1;

/// Build a test `ServerConfig` with safe defaults and the in-memory store.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
        store_backend: StoreBackend::Memory,
        database_url: None,
        payment_webhook_secret: Some(TEST_WEBHOOK_SECRET.to_string()),
        pricing: TrackPricing::default(),
        sync_policy: SyncPolicy::default(),
    }
}

pub fn test_state(config: &ServerConfig) -> AppState {
    AppState {
        service: DossierService::new(Arc::new(MemoryStore::new()), config.pricing),
        config: Arc::new(config.clone()),
        event_bus: Arc::new(EventBus::default()),
        pool: None,
    }
}

/// The full application router over a fresh in-memory store, with the same
/// middleware stack production uses.
pub fn build_test_app() -> Router {
    let config = test_config();
    build_app_router(test_state(&config), &config)
}

/// Like [`build_test_app`], also returning the state so tests can subscribe
/// to the event bus.
pub fn build_test_app_with_state() -> (Router, AppState) {
    let config = test_config();
    let state = test_state(&config);
    (build_app_router(state.clone(), &config), state)
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

pub fn token_for(id: i64, role: Role) -> String {
    let identity = Identity {
        id,
        email: format!("user{id}@example.be"),
        name: None,
        role,
    };
    generate_access_token(&identity, &test_config().jwt).expect("token generation should succeed")
}

pub fn client_token(id: i64) -> String {
    token_for(id, Role::Client)
}

pub fn admin_token() -> String {
    token_for(ADMIN_ID, Role::Admin)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router should respond")
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, request("GET", uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request("GET", uri, Some(token), None)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, request("POST", uri, Some(token), Some(body))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, request("PUT", uri, Some(token), Some(body))).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, request("PATCH", uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request("DELETE", uri, Some(token), None)).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a dossier as client `owner` and return its JSON view.
pub async fn create_dossier(app: Router, owner: i64, track: &str) -> serde_json::Value {
    let response = post_json_auth(
        app,
        "/api/v1/dossiers",
        serde_json::json!({ "type": track }),
        &client_token(owner),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
