//! Track-slot routes.
//!
//! Mounted at `/local` by `api_routes()`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::local;
use crate::state::AppState;

/// ```text
/// GET    /                     -> list_local
/// GET    /{track}              -> load_local
/// PUT    /{track}              -> save_local
/// DELETE /{track}              -> reset_local
/// GET    /{track}/progress     -> load_progress
/// PUT    /{track}/progress     -> save_progress
/// POST   /{track}/advance      -> advance_local
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(local::list_local))
        .route(
            "/{track}",
            get(local::load_local)
                .put(local::save_local)
                .delete(local::reset_local),
        )
        .route(
            "/{track}/progress",
            get(local::load_progress).put(local::save_progress),
        )
        .route("/{track}/advance", post(local::advance_local))
}
