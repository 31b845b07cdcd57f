use std::sync::Arc;

use dossier_core::service::DossierService;
use dossier_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Dossier operations over the configured store.
    pub service: DossierService,
    pub config: Arc<ServerConfig>,
    /// Bus for dossier change events (change stream, notifications).
    pub event_bus: Arc<EventBus>,
    /// Database pool when the PostgreSQL store is in use. Only the health
    /// check reads it directly.
    pub pool: Option<dossier_db::DbPool>,
}
