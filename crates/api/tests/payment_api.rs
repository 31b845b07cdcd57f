//! HTTP-level integration tests for the payment webhook.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    admin_token, body_json, build_test_app, build_test_app_with_state, create_dossier,
    put_json_auth, send, TEST_WEBHOOK_SECRET,
};
use dossier_core::payment::compute_signature;
use dossier_events::DossierEvent;
use serde_json::json;

const URI: &str = "/api/v1/payments/completed";

fn payment_request(body: &serde_json::Value, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(URI)
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("x-payment-signature", signature);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn signed(body: &serde_json::Value) -> Request<Body> {
    let signature = compute_signature(TEST_WEBHOOK_SECRET, body.to_string().as_bytes());
    payment_request(body, Some(&signature))
}

fn customer(id: i64) -> serde_json::Value {
    json!({ "id": id, "email": format!("user{id}@example.be"), "name": "Ana Peeters" })
}

#[tokio::test]
async fn test_unsigned_payment_is_rejected() {
    let app = build_test_app();
    let body = json!({ "track": "srl", "customer": customer(10) });

    let response = send(app.clone(), payment_request(&body, None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(app, payment_request(&body, Some("deadbeef"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid payment signature");
}

#[tokio::test]
async fn test_payment_creates_dossier_and_is_idempotent() {
    let app = build_test_app();
    let body = json!({ "track": "srl", "customer": customer(10) });

    let response = send(app.clone(), signed(&body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first = body_json(response).await["data"].clone();
    assert_eq!(first["created"], true);
    assert_eq!(first["changed"], true);
    assert_eq!(first["dossier"]["ownerId"], 10);
    assert_eq!(first["dossier"]["draft"]["meta"]["status"], "paid");
    assert_eq!(first["dossier"]["draft"]["workflow"]["status"], "in_progress");

    // Redelivery lands on the same dossier and changes nothing.
    let response = send(app, signed(&body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_json(response).await["data"].clone();
    assert_eq!(second["created"], false);
    assert_eq!(second["changed"], false);
    assert_eq!(second["dossier"]["id"], first["dossier"]["id"]);
}

#[tokio::test]
async fn test_payment_for_named_dossier() {
    let app = build_test_app();
    let dossier = create_dossier(app.clone(), 10, "pp").await;
    let id = dossier["id"].as_i64().unwrap();

    let body = json!({ "dossierId": id, "track": "pp", "customer": customer(10) });
    let response = send(app.clone(), signed(&body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = body_json(response).await["data"].clone();
    assert_eq!(outcome["dossier"]["id"], id);
    assert_eq!(outcome["dossier"]["draft"]["workflow"]["status"], "in_progress");

    // Another customer cannot claim it.
    let body = json!({ "dossierId": id, "track": "pp", "customer": customer(11) });
    let response = send(app, signed(&body)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_payment_on_started_dossier_publishes_no_status_change() {
    let (app, state) = build_test_app_with_state();
    let dossier = create_dossier(app.clone(), 10, "pp").await;
    let id = dossier["id"].as_i64().unwrap();

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/admin/dossiers/{id}/status"),
        json!({ "status": "in_progress" }),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut events = state.event_bus.subscribe();
    let body = json!({ "dossierId": id, "track": "pp", "customer": customer(10) });
    let response = send(app, signed(&body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = body_json(response).await["data"].clone();
    assert_eq!(outcome["changed"], true);
    assert_eq!(outcome["dossier"]["draft"]["meta"]["status"], "paid");

    while let Ok(event) = events.try_recv() {
        assert!(
            !matches!(event, DossierEvent::StatusChanged { .. }),
            "a meta-only change must not publish StatusChanged"
        );
    }
}

#[tokio::test]
async fn test_malformed_payment_body_is_bad_request() {
    let app = build_test_app();
    let body = json!({ "track": "srl" });

    let response = send(app, signed(&body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}
