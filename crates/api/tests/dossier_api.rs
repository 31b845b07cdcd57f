//! HTTP-level integration tests for the client `/dossiers` endpoints.
//!
//! Requests go through the full router (middleware included) with
//! `tower::ServiceExt::oneshot`, over the in-memory store.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, client_token, create_dossier, get, get_auth, patch_json_auth,
    post_json_auth,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Authentication and ownership
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let app = build_test_app();

    let response = get(app.clone(), "/api/v1/dossiers").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");

    let response = get_auth(app, "/api/v1/dossiers", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_foreign_dossier_is_not_found() {
    let app = build_test_app();
    let dossier = create_dossier(app.clone(), 10, "srl").await;
    let id = dossier["id"].as_i64().unwrap();

    let response = get_auth(app.clone(), &format!("/api/v1/dossiers/{id}"), &client_token(11)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");

    let response = patch_json_auth(
        app,
        &format!("/api/v1/dossiers/{id}"),
        dossier["draft"].clone(),
        &client_token(11),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Create, get, list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_srl_dossier_starts_with_first_stages_visible() {
    let app = build_test_app();
    let dossier = create_dossier(app, 10, "srl").await;

    assert_eq!(dossier["ownerId"], 10);
    assert_eq!(dossier["ownerEmail"], "user10@example.be");
    assert_eq!(dossier["draft"]["type"], "srl");
    assert_eq!(dossier["draft"]["workflow"]["status"], "new");
    assert_eq!(
        dossier["visibleStages"],
        json!(["dossier", "domiciliation", "comptable"])
    );
}

#[tokio::test]
async fn test_create_pp_dossier_has_no_stages() {
    let app = build_test_app();
    let dossier = create_dossier(app, 10, "pp").await;

    assert_eq!(dossier["draft"]["type"], "pp");
    assert!(dossier["draft"]["workflow"]["srl"].is_null());
    assert_eq!(dossier["visibleStages"], json!([]));
}

#[tokio::test]
async fn test_create_with_unknown_track_is_rejected() {
    let app = build_test_app();
    let response = post_json_auth(
        app,
        "/api/v1/dossiers",
        json!({ "type": "sa" }),
        &client_token(10),
    )
    .await;
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_list_returns_only_own_dossiers() {
    let app = build_test_app();
    create_dossier(app.clone(), 10, "srl").await;
    create_dossier(app.clone(), 10, "pp").await;
    create_dossier(app.clone(), 11, "srl").await;

    let response = get_auth(app.clone(), "/api/v1/dossiers", &client_token(10)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let response = get_auth(
        app,
        "/api/v1/dossiers?status=in_progress",
        &client_token(10),
    )
    .await;
    let json = body_json(response).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Client writes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_patch_keeps_admin_fields_and_takes_client_fields() {
    let app = build_test_app();
    let dossier = create_dossier(app.clone(), 10, "srl").await;
    let id = dossier["id"].as_i64().unwrap();

    let mut draft = dossier["draft"].clone();
    draft["identite"]["firstName"] = json!("Ana");
    draft["meta"]["status"] = json!("paid");
    draft["workflow"]["status"] = json!("approved");
    draft["workflow"]["srl"]["banque"]["status"] = json!("done");
    draft["workflow"]["srl"]["banque"]["adminNote"] = json!("ok");
    draft["workflow"]["srl"]["banque"]["attestationFileName"] = json!("attestation.pdf");

    let response = patch_json_auth(
        app,
        &format!("/api/v1/dossiers/{id}"),
        draft,
        &client_token(10),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let saved = body_json(response).await["data"].clone();
    assert_eq!(saved["draft"]["identite"]["firstName"], "Ana");
    assert_eq!(saved["draft"]["meta"]["status"], "draft");
    assert_eq!(saved["draft"]["workflow"]["status"], "new");
    let banque = &saved["draft"]["workflow"]["srl"]["banque"];
    assert_eq!(banque["status"], "pending");
    assert!(banque["adminNote"].is_null());
    assert_eq!(banque["attestationFileName"], "attestation.pdf");
}

#[tokio::test]
async fn test_advance_reports_violations_with_ok_status() {
    let app = build_test_app();
    let dossier = create_dossier(app.clone(), 10, "srl").await;
    let id = dossier["id"].as_i64().unwrap();

    let response = post_json_auth(
        app,
        &format!("/api/v1/dossiers/{id}/advance"),
        json!({ "step": "identite" }),
        &client_token(10),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let outcome = body_json(response).await["data"].clone();
    assert_eq!(outcome["advanced"], false);
    assert_eq!(outcome["progress"], 0);
    let fields: Vec<&str> = outcome["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"identite.firstName"));
    assert!(fields.contains(&"identite.email"));
}

#[tokio::test]
async fn test_advance_saves_draft_and_moves_progress() {
    let app = build_test_app();
    let dossier = create_dossier(app.clone(), 10, "srl").await;
    let id = dossier["id"].as_i64().unwrap();

    let mut draft = dossier["draft"].clone();
    draft["identite"]["firstName"] = json!("Ana");
    draft["identite"]["lastName"] = json!("Peeters");
    draft["identite"]["email"] = json!("ana@example.be");

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/dossiers/{id}/advance"),
        json!({ "step": "identite", "draft": draft }),
        &client_token(10),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = body_json(response).await["data"].clone();
    assert_eq!(outcome["advanced"], true);
    assert_eq!(outcome["progress"], 1);

    let response = get_auth(app, &format!("/api/v1/dossiers/{id}"), &client_token(10)).await;
    let view = body_json(response).await["data"].clone();
    assert_eq!(view["progress"], 1);
    assert_eq!(view["draft"]["identite"]["lastName"], "Peeters");
}

// ---------------------------------------------------------------------------
// History and messages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_history_starts_with_new() {
    let app = build_test_app();
    let dossier = create_dossier(app.clone(), 10, "srl").await;
    let id = dossier["id"].as_i64().unwrap();

    let response = get_auth(
        app,
        &format!("/api/v1/dossiers/{id}/history"),
        &client_token(10),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let history = body_json(response).await["data"].clone();
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["status"], "new");
}

#[tokio::test]
async fn test_client_messages_round_trip_through_thread() {
    let app = build_test_app();
    let dossier = create_dossier(app.clone(), 10, "srl").await;
    let id = dossier["id"].as_i64().unwrap();
    let uri = format!("/api/v1/dossiers/{id}/messages");

    let response = post_json_auth(
        app.clone(),
        &uri,
        json!({ "text": "  Quand aurai-je le plan financier ?  " }),
        &client_token(10),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let message = body_json(response).await["data"].clone();
    assert_eq!(message["sender"], "client");
    assert_eq!(message["text"], "Quand aurai-je le plan financier ?");

    let response = get_auth(app, &uri, &client_token(10)).await;
    let thread = body_json(response).await["data"].clone();
    assert_eq!(thread.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_blank_message_is_a_validation_error() {
    let app = build_test_app();
    let dossier = create_dossier(app.clone(), 10, "srl").await;
    let id = dossier["id"].as_i64().unwrap();

    let response = post_json_auth(
        app,
        &format!("/api/v1/dossiers/{id}/messages"),
        json!({ "text": "   " }),
        &client_token(10),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Change stream
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_change_stream_is_owner_only() {
    let app = build_test_app();
    let dossier = create_dossier(app.clone(), 10, "srl").await;
    let id = dossier["id"].as_i64().unwrap();
    let uri = format!("/api/v1/dossiers/{id}/events");

    let response = get_auth(app.clone(), &uri, &client_token(11)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app, &uri, &client_token(10)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));
}
