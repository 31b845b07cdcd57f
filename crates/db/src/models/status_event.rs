//! Status history row model.

use dossier_core::draft::WorkflowStatus;
use dossier_core::history::StatusEvent;
use dossier_core::store::StoreError;
use dossier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `dossier_status_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusEventRow {
    pub id: DbId,
    pub dossier_id: DbId,
    pub status: String,
    pub at: Timestamp,
}

impl TryFrom<StatusEventRow> for StatusEvent {
    type Error = StoreError;

    fn try_from(row: StatusEventRow) -> Result<Self, Self::Error> {
        let status = WorkflowStatus::from_str_db(&row.status)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(StatusEvent { status, at: row.at })
    }
}
