use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use super::parse_track;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct QuoteParams {
    pub promo: Option<String>,
}

// ---------------------------------------------------------------------------
// GET /pricing/{track}
// ---------------------------------------------------------------------------

/// Price of a track, with `?promo=CODE` applied. Public. An unknown or
/// inactive code is a validation error.
pub async fn quote(
    State(state): State<AppState>,
    Path(track): Path<String>,
    Query(params): Query<QuoteParams>,
) -> AppResult<impl IntoResponse> {
    let track = parse_track(&track)?;
    let breakdown = state.service.quote(track, params.promo.as_deref()).await?;
    Ok(Json(DataResponse { data: breakdown }))
}
