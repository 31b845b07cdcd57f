//! Back-office dossier handlers (admin only).
//!
//! Admin writes are authoritative: they bypass the client sanitizer, append
//! to the status history when the workflow status changes, and announce the
//! stages they make visible so the owner can be notified.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use dossier_core::draft::{Draft, WorkflowStatus};
use dossier_core::stages::{StageId, StageStatus};
use dossier_core::types::DbId;
use serde::Deserialize;

use super::dossiers::DossierListParams;
use super::{parse_track, publish_admin_update, publish_message};
use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetWorkflowStatusRequest {
    pub status: WorkflowStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStageStatusRequest {
    pub status: StageStatus,
    /// Replaces the stage's admin note. An empty string clears it; absent
    /// keeps it.
    #[serde(default)]
    pub admin_note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminMessageRequest {
    pub text: String,
}

// ---------------------------------------------------------------------------
// GET /admin/dossiers
// ---------------------------------------------------------------------------

pub async fn list_dossiers(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<DossierListParams>,
) -> AppResult<impl IntoResponse> {
    let summaries = state.service.list_all(params.status).await?;
    Ok(Json(DataResponse { data: summaries }))
}

// ---------------------------------------------------------------------------
// GET /admin/dossiers/{id}
// ---------------------------------------------------------------------------

pub async fn get_dossier(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let view = state.service.admin_get(id).await?;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// PUT /admin/dossiers/{id}
// ---------------------------------------------------------------------------

/// Replace the whole draft. The track cannot change.
pub async fn update_dossier(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(draft): Json<Draft>,
) -> AppResult<impl IntoResponse> {
    let update = state.service.admin_update(id, draft).await?;
    publish_admin_update(&state, &update);

    tracing::info!(
        dossier_id = id,
        admin_id = admin.identity.id,
        unlocked = update.unlocked.len(),
        "Dossier draft replaced by admin"
    );

    Ok(Json(DataResponse { data: update.view }))
}

// ---------------------------------------------------------------------------
// PUT /admin/dossiers/{id}/status
// ---------------------------------------------------------------------------

pub async fn set_workflow_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetWorkflowStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let update = state.service.set_workflow_status(id, input.status).await?;
    publish_admin_update(&state, &update);

    tracing::info!(
        dossier_id = id,
        admin_id = admin.identity.id,
        status = input.status.as_str(),
        "Workflow status set"
    );

    Ok(Json(DataResponse { data: update.view }))
}

// ---------------------------------------------------------------------------
// PUT /admin/dossiers/{id}/stages/{stage}
// ---------------------------------------------------------------------------

/// Set one stage's status. `{stage}` is the stage key (`banque`) or its
/// number (`3`).
pub async fn set_stage_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((id, stage)): Path<(DbId, String)>,
    Json(input): Json<SetStageStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let stage = StageId::from_key(&stage)?;
    let update = state
        .service
        .set_stage_status(id, stage, input.status, input.admin_note)
        .await?;
    publish_admin_update(&state, &update);

    tracing::info!(
        dossier_id = id,
        admin_id = admin.identity.id,
        stage = stage.key(),
        status = input.status.as_str(),
        "Stage status set"
    );

    Ok(Json(DataResponse { data: update.view }))
}

// ---------------------------------------------------------------------------
// PUT /admin/local/{track}/stages/{stage}
// ---------------------------------------------------------------------------

/// Stage write on a local track slot. Slots have no id, so nothing is
/// published.
pub async fn set_local_stage_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((track, stage)): Path<(String, String)>,
    Json(input): Json<SetStageStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let track = parse_track(&track)?;
    let stage = StageId::from_key(&stage)?;
    let slot = state
        .service
        .set_local_stage_status(track, stage, input.status, input.admin_note)
        .await?;

    tracing::info!(
        track = track.as_str(),
        admin_id = admin.identity.id,
        stage = stage.key(),
        "Local stage status set"
    );

    Ok(Json(DataResponse { data: slot }))
}

// ---------------------------------------------------------------------------
// GET /admin/dossiers/{id}/history
// ---------------------------------------------------------------------------

pub async fn history(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let events = state.service.admin_history(id).await?;
    Ok(Json(DataResponse { data: events }))
}

// ---------------------------------------------------------------------------
// GET /admin/dossiers/{id}/messages
// ---------------------------------------------------------------------------

pub async fn list_messages(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let messages = state.service.admin_messages(id).await?;
    Ok(Json(DataResponse { data: messages }))
}

// ---------------------------------------------------------------------------
// POST /admin/dossiers/{id}/messages
// ---------------------------------------------------------------------------

pub async fn post_message(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AdminMessageRequest>,
) -> AppResult<impl IntoResponse> {
    let owner_id = state.service.admin_get(id).await?.owner_id;
    let message = state.service.post_admin_message(id, &input.text).await?;
    publish_message(&state, owner_id, &message);
    Ok((StatusCode::CREATED, Json(DataResponse { data: message })))
}
