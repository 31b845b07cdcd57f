use axum::extract::State;
use axum::Json;
use dossier_core::autosave::SyncPolicy;
use dossier_core::promo::TrackPricing;
use serde::Serialize;

use crate::response::DataResponse;
use crate::state::AppState;

/// Settings the client form needs before it starts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub sync_policy: SyncPolicy,
    /// Delay before this client's first poll, jittered so clients spread out.
    pub next_poll_delay_ms: u64,
    pub pricing: TrackPricing,
}

// ---------------------------------------------------------------------------
// GET /client-config
// ---------------------------------------------------------------------------

pub async fn client_config(State(state): State<AppState>) -> Json<DataResponse<ClientConfig>> {
    let sync_policy = state.config.sync_policy;
    let next_poll_delay_ms = u64::try_from(sync_policy.sample_poll_delay().as_millis())
        .unwrap_or(sync_policy.poll_interval_ms);
    Json(DataResponse {
        data: ClientConfig {
            sync_policy,
            next_poll_delay_ms,
            pricing: state.service.pricing(),
        },
    })
}
