//! Client-facing dossier handlers.
//!
//! Every endpoint requires authentication and only reaches dossiers owned by
//! the caller; a foreign dossier answers 404 like a missing one. Writes go
//! through the draft sanitizer in [`DossierService::client_update`].
//!
//! [`DossierService::client_update`]: dossier_core::service::DossierService::client_update

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use dossier_core::draft::{Draft, Track, WorkflowStatus};
use dossier_core::message::Sender;
use dossier_core::types::DbId;
use dossier_core::validation::OnboardingStep;
use serde::Deserialize;

use super::{publish_message, publish_updated};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateDossierRequest {
    #[serde(rename = "type")]
    pub track: Track,
}

#[derive(Debug, Default, Deserialize)]
pub struct DossierListParams {
    pub status: Option<WorkflowStatus>,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub step: OnboardingStep,
    /// Draft to save before validating. Without it the stored draft is checked.
    #[serde(default)]
    pub draft: Option<Draft>,
}

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub text: String,
}

// ---------------------------------------------------------------------------
// POST /dossiers
// ---------------------------------------------------------------------------

pub async fn create_dossier(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateDossierRequest>,
) -> AppResult<impl IntoResponse> {
    let view = state
        .service
        .create_dossier(&auth.identity, input.track)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

// ---------------------------------------------------------------------------
// GET /dossiers
// ---------------------------------------------------------------------------

/// The caller's dossiers, most recently updated first.
pub async fn list_dossiers(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DossierListParams>,
) -> AppResult<impl IntoResponse> {
    let summaries = state
        .service
        .list_for_owner(&auth.identity, params.status)
        .await?;
    Ok(Json(DataResponse { data: summaries }))
}

// ---------------------------------------------------------------------------
// GET /dossiers/{id}
// ---------------------------------------------------------------------------

pub async fn get_dossier(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let view = state.service.get_dossier(&auth.identity, id).await?;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// PATCH /dossiers/{id}
// ---------------------------------------------------------------------------

/// Save the client's draft. Admin-owned values sent by the client are
/// silently replaced with the stored ones.
pub async fn update_dossier(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(draft): Json<Draft>,
) -> AppResult<impl IntoResponse> {
    let view = state
        .service
        .client_update(&auth.identity, id, draft)
        .await?;
    publish_updated(&state, &view, Sender::Client);
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// POST /dossiers/{id}/advance
// ---------------------------------------------------------------------------

/// Save-and-advance. Field problems come back as violations with 200 so the
/// form can show them inline.
pub async fn advance(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AdvanceRequest>,
) -> AppResult<impl IntoResponse> {
    let saved_draft = input.draft.is_some();
    let outcome = state
        .service
        .advance(&auth.identity, id, input.step, input.draft)
        .await?;

    if saved_draft {
        let view = state.service.get_dossier(&auth.identity, id).await?;
        publish_updated(&state, &view, Sender::Client);
    }

    tracing::debug!(
        dossier_id = id,
        step = input.step.index(),
        advanced = outcome.advanced,
        violations = outcome.violations.len(),
        "Onboarding step evaluated"
    );

    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// GET /dossiers/{id}/history
// ---------------------------------------------------------------------------

pub async fn history(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let events = state.service.history(&auth.identity, id).await?;
    Ok(Json(DataResponse { data: events }))
}

// ---------------------------------------------------------------------------
// GET /dossiers/{id}/messages
// ---------------------------------------------------------------------------

pub async fn list_messages(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let messages = state.service.messages(&auth.identity, id).await?;
    Ok(Json(DataResponse { data: messages }))
}

// ---------------------------------------------------------------------------
// POST /dossiers/{id}/messages
// ---------------------------------------------------------------------------

pub async fn post_message(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<PostMessageRequest>,
) -> AppResult<impl IntoResponse> {
    let message = state
        .service
        .post_client_message(&auth.identity, id, &input.text)
        .await?;
    publish_message(&state, auth.identity.id, &message);
    Ok((StatusCode::CREATED, Json(DataResponse { data: message })))
}
