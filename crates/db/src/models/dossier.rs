//! Dossier row model.

use dossier_core::draft::Draft;
use dossier_core::store::{DossierRecord, StoreError};
use dossier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `dossiers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DossierRow {
    pub id: DbId,
    pub owner_id: DbId,
    pub owner_email: String,
    pub track: String,
    pub status: String,
    pub draft: serde_json::Value,
    pub progress: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a dossier.
#[derive(Debug)]
pub struct CreateDossier {
    pub owner_id: DbId,
    pub owner_email: String,
    pub track: String,
    pub status: String,
    pub draft: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CreateDossier {
    pub fn from_draft(
        owner_id: DbId,
        owner_email: String,
        draft: &Draft,
        created_at: Timestamp,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            owner_id,
            owner_email,
            track: draft.track.as_str().to_string(),
            status: draft.status().as_str().to_string(),
            draft: serde_json::to_value(draft)?,
            created_at,
            updated_at: draft.updated_at(),
        })
    }
}

impl TryFrom<DossierRow> for DossierRecord {
    type Error = StoreError;

    fn try_from(row: DossierRow) -> Result<Self, Self::Error> {
        Ok(DossierRecord {
            id: row.id,
            owner_id: row.owner_id,
            owner_email: row.owner_email,
            draft: serde_json::from_value(row.draft)?,
            progress: row.progress.and_then(|p| u32::try_from(p).ok()),
            created_at: row.created_at,
        })
    }
}
