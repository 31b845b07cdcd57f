//! [`DossierStore`] backed by PostgreSQL.
//!
//! Draft edits run in a transaction holding `SELECT ... FOR UPDATE` on the
//! dossier or slot row, so concurrent writers are serialized per record.

use async_trait::async_trait;
use dossier_core::draft::{Draft, Track, WorkflowStatus};
use dossier_core::error::CoreError;
use dossier_core::history::{should_append, StatusEvent};
use dossier_core::message::{Message, NewMessage};
use dossier_core::promo::PromoCode;
use dossier_core::store::{
    DossierRecord, DossierStore, DraftChange, DraftEdit, NewDossier, StoreError, StoreResult,
    TrackDraftEdit,
};
use dossier_core::types::{DbId, Timestamp};
use sqlx::{Postgres, Transaction};

use crate::models::dossier::CreateDossier;
use crate::models::promo_code::promo_type_str;
use crate::repositories::{
    DossierRepo, MessageRepo, PromoCodeRepo, StatusEventRepo, TrackSlotRepo,
};
use crate::DbPool;

/// The hosted, authoritative store.
#[derive(Clone)]
pub struct PgDossierStore {
    pool: DbPool,
}

impl PgDossierStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    tracing::error!(error = %err, "Database error in dossier store");
    StoreError::Backend(err.to_string())
}

/// Append `status` to the dossier's history unless it repeats the last event.
async fn record_status(
    tx: &mut Transaction<'_, Postgres>,
    dossier_id: DbId,
    status: WorkflowStatus,
    at: Timestamp,
) -> StoreResult<()> {
    let last = StatusEventRepo::last_for_dossier(tx, dossier_id)
        .await
        .map_err(backend)?
        .map(StatusEvent::try_from)
        .transpose()?;
    if should_append(last.as_slice(), status) {
        StatusEventRepo::append(tx, dossier_id, status.as_str(), at)
            .await
            .map_err(backend)?;
    }
    Ok(())
}

fn to_i32(step: u32) -> StoreResult<i32> {
    i32::try_from(step).map_err(|_| StoreError::Backend(format!("Progress {step} out of range")))
}

#[async_trait]
impl DossierStore for PgDossierStore {
    async fn load_track_draft(&self, track: Track) -> StoreResult<Option<Draft>> {
        let row = TrackSlotRepo::find(&self.pool, track.as_str())
            .await
            .map_err(backend)?;
        match row.and_then(|r| r.draft) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn update_track_draft(
        &self,
        track: Track,
        edit: TrackDraftEdit<'_>,
    ) -> Result<Draft, CoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;
        let row = TrackSlotRepo::lock(&mut tx, track.as_str())
            .await
            .map_err(backend)?;
        let current = row
            .draft
            .map(serde_json::from_value::<Draft>)
            .transpose()
            .map_err(StoreError::from)?;

        let next = edit(current)?;
        let value = serde_json::to_value(&next).map_err(StoreError::from)?;
        TrackSlotRepo::set_draft(&mut tx, track.as_str(), &value, next.status().as_str())
            .await
            .map_err(backend)?;
        tx.commit().await.map_err(backend)?;
        Ok(next)
    }

    async fn load_track_status(&self, track: Track) -> StoreResult<Option<WorkflowStatus>> {
        let row = TrackSlotRepo::find(&self.pool, track.as_str())
            .await
            .map_err(backend)?;
        // An unreadable status key is treated as absent.
        Ok(row
            .and_then(|r| r.status)
            .and_then(|s| WorkflowStatus::from_str_db(&s).ok()))
    }

    async fn load_progress(&self, track: Track) -> StoreResult<Option<u32>> {
        let row = TrackSlotRepo::find(&self.pool, track.as_str())
            .await
            .map_err(backend)?;
        Ok(row
            .and_then(|r| r.progress)
            .and_then(|p| u32::try_from(p).ok()))
    }

    async fn save_progress(&self, track: Track, step: u32) -> StoreResult<()> {
        TrackSlotRepo::set_progress(&self.pool, track.as_str(), to_i32(step)?)
            .await
            .map_err(backend)
    }

    async fn clear_track(&self, track: Track) -> StoreResult<()> {
        TrackSlotRepo::delete(&self.pool, track.as_str())
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn insert_dossier(&self, input: NewDossier) -> StoreResult<DossierRecord> {
        let create =
            CreateDossier::from_draft(input.owner_id, input.owner_email, &input.draft, input.created_at)?;
        let mut tx = self.pool.begin().await.map_err(backend)?;
        let row = DossierRepo::create(&mut tx, &create)
            .await
            .map_err(backend)?;
        let record = DossierRecord::try_from(row)?;
        record_status(&mut tx, record.id, record.draft.status(), record.created_at).await?;
        tx.commit().await.map_err(backend)?;
        Ok(record)
    }

    async fn find_dossier(&self, id: DbId) -> StoreResult<Option<DossierRecord>> {
        DossierRepo::find_by_id(&self.pool, id)
            .await
            .map_err(backend)?
            .map(DossierRecord::try_from)
            .transpose()
    }

    async fn update_draft(
        &self,
        id: DbId,
        at: Timestamp,
        edit: DraftEdit<'_>,
    ) -> Result<Option<DraftChange>, CoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;
        let Some(row) = DossierRepo::lock_by_id(&mut tx, id).await.map_err(backend)? else {
            return Ok(None);
        };
        let before = DossierRecord::try_from(row)?;

        let next = edit(&before)?;
        let value = serde_json::to_value(&next).map_err(StoreError::from)?;
        let row = DossierRepo::update_draft(
            &mut tx,
            id,
            next.status().as_str(),
            &value,
            next.updated_at(),
        )
        .await
        .map_err(backend)?;
        if next.status() != before.draft.status() {
            record_status(&mut tx, id, next.status(), at).await?;
        }
        tx.commit().await.map_err(backend)?;

        let after = DossierRecord::try_from(row)?;
        Ok(Some(DraftChange { before, after }))
    }

    async fn save_dossier_progress(&self, id: DbId, step: u32) -> StoreResult<bool> {
        DossierRepo::update_progress(&self.pool, id, to_i32(step)?)
            .await
            .map_err(backend)
    }

    async fn list_dossiers_by_owner(&self, owner_id: DbId) -> StoreResult<Vec<DossierRecord>> {
        DossierRepo::list_by_owner(&self.pool, owner_id)
            .await
            .map_err(backend)?
            .into_iter()
            .map(DossierRecord::try_from)
            .collect()
    }

    async fn list_all_dossiers(&self) -> StoreResult<Vec<DossierRecord>> {
        DossierRepo::list_all(&self.pool)
            .await
            .map_err(backend)?
            .into_iter()
            .map(DossierRecord::try_from)
            .collect()
    }

    async fn status_history(&self, dossier_id: DbId) -> StoreResult<Vec<StatusEvent>> {
        StatusEventRepo::list_for_dossier(&self.pool, dossier_id)
            .await
            .map_err(backend)?
            .into_iter()
            .map(StatusEvent::try_from)
            .collect()
    }

    async fn list_messages(&self, dossier_id: DbId) -> StoreResult<Vec<Message>> {
        MessageRepo::list_for_dossier(&self.pool, dossier_id)
            .await
            .map_err(backend)?
            .into_iter()
            .map(Message::try_from)
            .collect()
    }

    async fn insert_message(&self, input: NewMessage) -> StoreResult<Message> {
        let row = MessageRepo::create(
            &self.pool,
            input.dossier_id,
            input.sender.as_str(),
            &input.text,
            input.created_at,
        )
        .await
        .map_err(backend)?;
        Message::try_from(row)
    }

    async fn upsert_promo(&self, promo: &PromoCode) -> StoreResult<PromoCode> {
        let row = PromoCodeRepo::upsert(
            &self.pool,
            &promo.code,
            promo_type_str(promo.promo_type),
            promo.value,
            promo.active,
            promo.note.as_deref(),
        )
        .await
        .map_err(backend)?;
        PromoCode::try_from(row)
    }

    async fn find_promo(&self, code: &str) -> StoreResult<Option<PromoCode>> {
        PromoCodeRepo::find_by_code(&self.pool, code)
            .await
            .map_err(backend)?
            .map(PromoCode::try_from)
            .transpose()
    }

    async fn list_promos(&self) -> StoreResult<Vec<PromoCode>> {
        PromoCodeRepo::list(&self.pool)
            .await
            .map_err(backend)?
            .into_iter()
            .map(PromoCode::try_from)
            .collect()
    }
}
