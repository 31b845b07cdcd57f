//! Track slot row model.

use dossier_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `track_slots` table. Every column but the key is optional:
/// a slot may hold progress before any draft is saved.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrackSlotRow {
    pub track: String,
    pub draft: Option<serde_json::Value>,
    pub status: Option<String>,
    pub progress: Option<i32>,
    pub updated_at: Timestamp,
}
