//! Back-office routes (admin only).
//!
//! Mounted at `/admin` by `api_routes()`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{admin, promo_codes};
use crate::state::AppState;

/// ```text
/// GET    /dossiers                       -> list_dossiers
/// GET    /dossiers/{id}                  -> get_dossier
/// PUT    /dossiers/{id}                  -> update_dossier
/// PUT    /dossiers/{id}/status           -> set_workflow_status
/// PUT    /dossiers/{id}/stages/{stage}   -> set_stage_status
/// GET    /dossiers/{id}/history          -> history
/// GET    /dossiers/{id}/messages         -> list_messages
/// POST   /dossiers/{id}/messages         -> post_message
/// PUT    /local/{track}/stages/{stage}   -> set_local_stage_status
/// GET    /promo-codes                    -> list_promo_codes
/// PUT    /promo-codes                    -> upsert_promo_code
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dossiers", get(admin::list_dossiers))
        .route(
            "/dossiers/{id}",
            get(admin::get_dossier).put(admin::update_dossier),
        )
        .route("/dossiers/{id}/status", put(admin::set_workflow_status))
        .route(
            "/dossiers/{id}/stages/{stage}",
            put(admin::set_stage_status),
        )
        .route("/dossiers/{id}/history", get(admin::history))
        .route(
            "/dossiers/{id}/messages",
            get(admin::list_messages).post(admin::post_message),
        )
        .route(
            "/local/{track}/stages/{stage}",
            put(admin::set_local_stage_status),
        )
        .route(
            "/promo-codes",
            get(promo_codes::list_promo_codes).put(promo_codes::upsert_promo_code),
        )
}
