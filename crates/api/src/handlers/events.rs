//! Server-sent change stream for one dossier.
//!
//! Clients keep polling on the [`SyncPolicy`](dossier_core::autosave::SyncPolicy)
//! interval; the stream only tells them to refetch sooner.

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use dossier_core::types::DbId;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /dossiers/{id}/events
// ---------------------------------------------------------------------------

/// Stream the events of dossier `id`. Each SSE message is named after the
/// event kind and carries the event as JSON.
pub async fn dossier_events(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    // Ownership check before subscribing.
    state.service.get_dossier(&auth.identity, id).await?;

    let user_id = auth.identity.id;
    tracing::debug!(dossier_id = id, user_id, "Change stream opened");

    let stream = BroadcastStream::new(state.event_bus.subscribe()).filter_map(move |item| {
        match item {
            Ok(event) if event.dossier_id() == id => {
                Some(Event::default().event(event.kind()).json_data(&event))
            }
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(dossier_id = id, user_id, skipped, "Change stream lagged");
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
