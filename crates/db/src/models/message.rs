//! Message row model.

use dossier_core::message::{Message, Sender};
use dossier_core::store::StoreError;
use dossier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `dossier_messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageRow {
    pub id: DbId,
    pub dossier_id: DbId,
    pub sender: String,
    pub text: String,
    pub created_at: Timestamp,
}

impl TryFrom<MessageRow> for Message {
    type Error = StoreError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let sender =
            Sender::from_str_db(&row.sender).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Message {
            id: row.id,
            dossier_id: row.dossier_id,
            sender,
            text: row.text,
            created_at: row.created_at,
        })
    }
}
