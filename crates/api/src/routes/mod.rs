pub mod admin;
pub mod dossiers;
pub mod health;
pub mod local;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /client-config                                   sync policy and prices (public)
/// /pricing/{track}?promo=CODE                      price quote (public)
/// /payments/completed                              payment webhook (signed)
///
/// /dossiers                                        create, list own
/// /dossiers/{id}                                   get, client write
/// /dossiers/{id}/advance                           save and advance (POST)
/// /dossiers/{id}/history                           status history
/// /dossiers/{id}/messages                          list, post
/// /dossiers/{id}/events                            change stream (SSE)
///
/// /admin/dossiers                                  list all (admin only)
/// /admin/dossiers/{id}                             get, replace draft
/// /admin/dossiers/{id}/status                      workflow status (PUT)
/// /admin/dossiers/{id}/stages/{stage}              stage status and note (PUT)
/// /admin/dossiers/{id}/history                     status history
/// /admin/dossiers/{id}/messages                    list, post
/// /admin/promo-codes                               list, upsert
///
/// /local                                           track-slot summaries
/// /local/{track}                                   get, save, reset
/// /local/{track}/progress                          get, save
/// /local/{track}/advance                           save and advance (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/client-config",
            get(handlers::client_config::client_config),
        )
        .route("/pricing/{track}", get(handlers::pricing::quote))
        .route(
            "/payments/completed",
            post(handlers::payments::payment_completed),
        )
        .nest("/dossiers", dossiers::router())
        .nest("/admin", admin::router())
        .nest("/local", local::router())
}
