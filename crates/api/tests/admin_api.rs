//! HTTP-level integration tests for the `/admin` endpoints: RBAC, stage
//! and workflow updates, the unlock events they publish, and promo codes.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, build_test_app, build_test_app_with_state, client_token,
    create_dossier, get, get_auth, patch_json_auth, post_json_auth, put_json_auth,
};
use dossier_core::stages::StageId;
use dossier_events::DossierEvent;
use serde_json::json;

fn stage_uri(id: i64, stage: &str) -> String {
    format!("/api/v1/admin/dossiers/{id}/stages/{stage}")
}

// ---------------------------------------------------------------------------
// RBAC
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_client_cannot_use_admin_routes() {
    let app = build_test_app();

    let response = get_auth(app.clone(), "/api/v1/admin/dossiers", &client_token(10)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FORBIDDEN");
    assert_eq!(json["error"], "Admin role required");

    let response = get(app, "/api/v1/admin/promo-codes").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_lists_every_dossier() {
    let app = build_test_app();
    create_dossier(app.clone(), 10, "srl").await;
    create_dossier(app.clone(), 11, "pp").await;

    let response = get_auth(app, "/api/v1/admin/dossiers", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Stage updates and visibility
// ---------------------------------------------------------------------------

/// Blank SRL dossier, stage 1 done by the admin, stage 2 appears; the client
/// uploads the bank attestation while stage 3 is still hidden and the file
/// is kept without revealing the stage.
#[tokio::test]
async fn test_stage_unlock_scenario() {
    let (app, state) = build_test_app_with_state();
    let mut events = state.event_bus.subscribe();

    let dossier = create_dossier(app.clone(), 10, "srl").await;
    let id = dossier["id"].as_i64().unwrap();
    let visible = dossier["visibleStages"].as_array().unwrap().clone();
    assert!(!visible.contains(&json!("planFinancier")));

    let response = put_json_auth(
        app.clone(),
        &stage_uri(id, "dossier"),
        json!({ "status": "done", "adminNote": "Dossier complet" }),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await["data"].clone();
    assert_eq!(view["draft"]["workflow"]["srl"]["dossier"]["status"], "done");
    assert_eq!(
        view["draft"]["workflow"]["srl"]["dossier"]["adminNote"],
        "Dossier complet"
    );
    let visible = view["visibleStages"].as_array().unwrap().clone();
    assert!(visible.contains(&json!("planFinancier")));
    assert!(!visible.contains(&json!("banque")));

    // Updated, then StagesUnlocked for stage 2.
    let mut unlocked = None;
    while let Ok(event) = events.try_recv() {
        if let DossierEvent::StagesUnlocked { stages, owner_email, .. } = event {
            unlocked = Some((stages, owner_email));
        }
    }
    let (stages, owner_email) = unlocked.expect("stage unlock should be published");
    assert_eq!(stages, vec![StageId::PlanFinancier]);
    assert_eq!(owner_email, "user10@example.be");

    let mut draft = view["draft"].clone();
    draft["workflow"]["srl"]["banque"]["attestationFileName"] = json!("attestation.pdf");
    let response = patch_json_auth(
        app.clone(),
        &format!("/api/v1/dossiers/{id}"),
        draft,
        &client_token(10),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let saved = body_json(response).await["data"].clone();
    assert_eq!(
        saved["draft"]["workflow"]["srl"]["banque"]["attestationFileName"],
        "attestation.pdf"
    );
    assert!(!saved["visibleStages"]
        .as_array()
        .unwrap()
        .contains(&json!("banque")));
}

#[tokio::test]
async fn test_stage_can_be_addressed_by_number() {
    let app = build_test_app();
    let dossier = create_dossier(app.clone(), 10, "srl").await;
    let id = dossier["id"].as_i64().unwrap();

    let response = put_json_auth(
        app,
        &stage_uri(id, "4"),
        json!({ "status": "incomplete" }),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await["data"].clone();
    assert_eq!(
        view["draft"]["workflow"]["srl"]["domiciliation"]["status"],
        "incomplete"
    );
}

#[tokio::test]
async fn test_unknown_stage_is_a_validation_error() {
    let app = build_test_app();
    let dossier = create_dossier(app.clone(), 10, "srl").await;
    let id = dossier["id"].as_i64().unwrap();

    let response = put_json_auth(
        app,
        &stage_uri(id, "13"),
        json!({ "status": "done" }),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_pp_dossier_has_no_stages_to_set() {
    let app = build_test_app();
    let dossier = create_dossier(app.clone(), 10, "pp").await;
    let id = dossier["id"].as_i64().unwrap();

    let response = put_json_auth(
        app,
        &stage_uri(id, "banque"),
        json!({ "status": "done" }),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Workflow status and history
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_workflow_status_changes_are_recorded() {
    let app = build_test_app();
    let dossier = create_dossier(app.clone(), 10, "srl").await;
    let id = dossier["id"].as_i64().unwrap();
    let status_uri = format!("/api/v1/admin/dossiers/{id}/status");

    for status in ["in_progress", "in_progress", "approved"] {
        let response = put_json_auth(
            app.clone(),
            &status_uri,
            json!({ "status": status }),
            &admin_token(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get_auth(
        app.clone(),
        &format!("/api/v1/admin/dossiers/{id}/history"),
        &admin_token(),
    )
    .await;
    let history = body_json(response).await["data"].clone();
    let statuses: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["new", "in_progress", "approved"]);

    // Approved is terminal.
    let response = put_json_auth(
        app,
        &status_uri,
        json!({ "status": "cancelled" }),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_admin_draft_write_cannot_change_track() {
    let app = build_test_app();
    let dossier = create_dossier(app.clone(), 10, "srl").await;
    let id = dossier["id"].as_i64().unwrap();

    let mut draft = dossier["draft"].clone();
    draft["type"] = json!("pp");
    draft["workflow"]["srl"]["banque"]["adminNote"] = json!("Banque recommandée : Belfius");

    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/dossiers/{id}"),
        draft,
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await["data"].clone();
    assert_eq!(view["draft"]["type"], "srl");
    assert_eq!(
        view["draft"]["workflow"]["srl"]["banque"]["adminNote"],
        "Banque recommandée : Belfius"
    );
}

#[tokio::test]
async fn test_admin_message_is_visible_to_owner() {
    let app = build_test_app();
    let dossier = create_dossier(app.clone(), 10, "srl").await;
    let id = dossier["id"].as_i64().unwrap();

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/admin/dossiers/{id}/messages"),
        json!({ "text": "Merci de fournir votre pièce d'identité." }),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(
        app,
        &format!("/api/v1/dossiers/{id}/messages"),
        &client_token(10),
    )
    .await;
    let thread = body_json(response).await["data"].clone();
    assert_eq!(thread[0]["sender"], "admin");
}

#[tokio::test]
async fn test_admin_get_missing_dossier_is_not_found() {
    let app = build_test_app();
    let response = get_auth(app, "/api/v1/admin/dossiers/999", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["error"],
        "Dossier with id 999 not found"
    );
}

// ---------------------------------------------------------------------------
// Promo codes and pricing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_promo_code_applies_to_quote() {
    let app = build_test_app();

    let response = put_json_auth(
        app.clone(),
        "/api/v1/admin/promo-codes",
        json!({ "code": " launch10 ", "type": "percent", "value": 10, "note": "Lancement" }),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let promo = body_json(response).await["data"].clone();
    assert_eq!(promo["code"], "LAUNCH10");
    assert_eq!(promo["active"], true);

    let response = get(app.clone(), "/api/v1/pricing/srl?promo=launch10").await;
    assert_eq!(response.status(), StatusCode::OK);
    let quote = body_json(response).await["data"].clone();
    assert_eq!(quote["baseEUR"].as_f64(), Some(1250.0));
    assert_eq!(quote["discountEUR"].as_f64(), Some(125.0));
    assert_eq!(quote["totalEUR"].as_f64(), Some(1125.0));

    let response = get_auth(app, "/api/v1/admin/promo-codes", &admin_token()).await;
    let promos = body_json(response).await["data"].clone();
    assert_eq!(promos.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_promo_code_is_rejected() {
    let app = build_test_app();

    let response = put_json_auth(
        app.clone(),
        "/api/v1/admin/promo-codes",
        json!({ "code": "BIG", "type": "percent", "value": 150 }),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(app, "/api/v1/pricing/pp?promo=NOPE").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}
