pub mod admin;
pub mod client_config;
pub mod dossiers;
pub mod events;
pub mod local;
pub mod payments;
pub mod pricing;
pub mod promo_codes;

use chrono::Utc;
use dossier_core::draft::Track;
use dossier_core::message::{Message, Sender};
use dossier_core::service::{AdminUpdate, DossierView};
use dossier_core::types::DbId;
use dossier_events::DossierEvent;

use crate::error::AppResult;
use crate::state::AppState;

/// Parse a `{track}` path segment.
pub(crate) fn parse_track(raw: &str) -> AppResult<Track> {
    Ok(Track::from_str_db(raw)?)
}

pub(crate) fn publish_updated(state: &AppState, view: &DossierView, by: Sender) {
    state.event_bus.publish(DossierEvent::Updated {
        dossier_id: view.id,
        owner_id: view.owner_id,
        by,
        at: Utc::now(),
    });
}

/// Publish everything an admin write produced: the update itself, a status
/// change, and the stages it made visible to the client.
pub(crate) fn publish_admin_update(state: &AppState, update: &AdminUpdate) {
    let view = &update.view;
    publish_updated(state, view, Sender::Admin);
    if let Some(status) = update.status_changed {
        state.event_bus.publish(DossierEvent::StatusChanged {
            dossier_id: view.id,
            owner_id: view.owner_id,
            status,
            at: Utc::now(),
        });
    }
    if !update.unlocked.is_empty() {
        state.event_bus.publish(DossierEvent::StagesUnlocked {
            dossier_id: view.id,
            owner_id: view.owner_id,
            owner_email: view.owner_email.clone(),
            stages: update.unlocked.clone(),
            at: Utc::now(),
        });
    }
}

pub(crate) fn publish_message(state: &AppState, owner_id: DbId, message: &Message) {
    state.event_bus.publish(DossierEvent::MessagePosted {
        dossier_id: message.dossier_id,
        owner_id,
        sender: message.sender,
        at: message.created_at,
    });
}
