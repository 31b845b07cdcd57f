//! Promo code management (admin only).

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use dossier_core::promo::PromoCode;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /admin/promo-codes
// ---------------------------------------------------------------------------

pub async fn list_promo_codes(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let promos = state.service.list_promos().await?;
    Ok(Json(DataResponse { data: promos }))
}

// ---------------------------------------------------------------------------
// PUT /admin/promo-codes
// ---------------------------------------------------------------------------

/// Create or replace a promo code, keyed by its normalized code.
pub async fn upsert_promo_code(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<PromoCode>,
) -> AppResult<impl IntoResponse> {
    let promo = state.service.upsert_promo(input).await?;
    Ok(Json(DataResponse { data: promo }))
}
