//! Track-slot handlers: one working draft per track, outside any dossier.
//!
//! This is the demo flow used before an account exists. Writes go through
//! the same sanitizer as owned dossiers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use dossier_core::draft::Draft;
use serde::{Deserialize, Serialize};

use super::dossiers::AdvanceRequest;
use super::parse_track;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressBody {
    pub step: u32,
}

// ---------------------------------------------------------------------------
// GET /local
// ---------------------------------------------------------------------------

pub async fn list_local(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let summaries = state.service.list_local().await?;
    Ok(Json(DataResponse { data: summaries }))
}

// ---------------------------------------------------------------------------
// GET /local/{track}
// ---------------------------------------------------------------------------

/// The slot's draft (blank for an empty slot) with its visible stages and
/// progress.
pub async fn load_local(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(track): Path<String>,
) -> AppResult<impl IntoResponse> {
    let track = parse_track(&track)?;
    let slot = state.service.load_local(track).await?;
    Ok(Json(DataResponse { data: slot }))
}

// ---------------------------------------------------------------------------
// PUT /local/{track}
// ---------------------------------------------------------------------------

pub async fn save_local(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(track): Path<String>,
    Json(draft): Json<Draft>,
) -> AppResult<impl IntoResponse> {
    let track = parse_track(&track)?;
    let saved = state.service.save_local(track, draft).await?;
    Ok(Json(DataResponse { data: saved }))
}

// ---------------------------------------------------------------------------
// DELETE /local/{track}
// ---------------------------------------------------------------------------

/// Forget the slot's draft, status and progress.
pub async fn reset_local(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(track): Path<String>,
) -> AppResult<impl IntoResponse> {
    let track = parse_track(&track)?;
    state.service.reset_local(track).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// GET /local/{track}/progress
// ---------------------------------------------------------------------------

pub async fn load_progress(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(track): Path<String>,
) -> AppResult<impl IntoResponse> {
    let track = parse_track(&track)?;
    let step = state.service.local_progress(track).await?;
    Ok(Json(DataResponse {
        data: ProgressBody { step },
    }))
}

// ---------------------------------------------------------------------------
// PUT /local/{track}/progress
// ---------------------------------------------------------------------------

pub async fn save_progress(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(track): Path<String>,
    Json(input): Json<ProgressBody>,
) -> AppResult<impl IntoResponse> {
    let track = parse_track(&track)?;
    let step = state.service.save_local_progress(track, input.step).await?;
    Ok(Json(DataResponse {
        data: ProgressBody { step },
    }))
}

// ---------------------------------------------------------------------------
// POST /local/{track}/advance
// ---------------------------------------------------------------------------

pub async fn advance_local(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(track): Path<String>,
    Json(input): Json<AdvanceRequest>,
) -> AppResult<impl IntoResponse> {
    let track = parse_track(&track)?;
    let outcome = state
        .service
        .advance_local(track, input.step, input.draft)
        .await?;
    Ok(Json(DataResponse { data: outcome }))
}
