//! Client dossier routes.
//!
//! Mounted at `/dossiers` by `api_routes()`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{dossiers, events};
use crate::state::AppState;

/// ```text
/// POST   /                  -> create_dossier
/// GET    /                  -> list_dossiers
/// GET    /{id}              -> get_dossier
/// PATCH  /{id}              -> update_dossier
/// POST   /{id}/advance      -> advance
/// GET    /{id}/history      -> history
/// GET    /{id}/messages     -> list_messages
/// POST   /{id}/messages     -> post_message
/// GET    /{id}/events       -> dossier_events
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(dossiers::create_dossier).get(dossiers::list_dossiers),
        )
        .route(
            "/{id}",
            get(dossiers::get_dossier).patch(dossiers::update_dossier),
        )
        .route("/{id}/advance", post(dossiers::advance))
        .route("/{id}/history", get(dossiers::history))
        .route(
            "/{id}/messages",
            get(dossiers::list_messages).post(dossiers::post_message),
        )
        .route("/{id}/events", get(events::dossier_events))
}
