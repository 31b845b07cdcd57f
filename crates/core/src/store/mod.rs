//! Persistence contract for dossiers.
//!
//! Business rules (merge, upgrade, visibility) live in
//! [`crate::service::DossierService`] and reach the store as edit closures.
//! A store applies an edit to the current draft while it holds that record,
//! so two writers never merge against the same stale copy. The status history
//! is appended in the same write, deduplicated with
//! [`crate::history::should_append`].
//!
//! Two families of data are stored:
//!
//! - **Track slots**: one draft per [`Track`] with its stored status and
//!   onboarding progress. This is the anonymous local flow.
//! - **Dossiers**: owned records with a status history and a message thread.
//!
//! Promo codes are stored alongside, keyed by normalized code.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::draft::{Draft, Track, WorkflowStatus};
use crate::error::CoreError;
use crate::history::StatusEvent;
use crate::message::{Message, NewMessage};
use crate::promo::PromoCode;
use crate::types::{DbId, Timestamp};

pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Stored draft could not be decoded: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A stored dossier. `draft` is exactly what was written, not yet upgraded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DossierRecord {
    pub id: DbId,
    pub owner_id: DbId,
    pub owner_email: String,
    pub draft: Draft,
    /// Index of the next onboarding step to show.
    pub progress: Option<u32>,
    pub created_at: Timestamp,
}

/// DTO for creating a dossier.
#[derive(Debug, Clone)]
pub struct NewDossier {
    pub owner_id: DbId,
    pub owner_email: String,
    pub draft: Draft,
    pub created_at: Timestamp,
}

/// Computes the next draft of a dossier from its stored record.
pub type DraftEdit<'a> = Box<dyn FnOnce(&DossierRecord) -> Result<Draft, CoreError> + Send + 'a>;

/// Computes the next draft of a track slot from the stored one, if any.
pub type TrackDraftEdit<'a> = Box<dyn FnOnce(Option<Draft>) -> Result<Draft, CoreError> + Send + 'a>;

/// A committed [`DraftEdit`].
#[derive(Debug, Clone, PartialEq)]
pub struct DraftChange {
    pub before: DossierRecord,
    pub after: DossierRecord,
}

#[async_trait]
pub trait DossierStore: Send + Sync {
    // ---- Track slots ----

    async fn load_track_draft(&self, track: Track) -> StoreResult<Option<Draft>>;

    /// Read-modify-write of a slot's draft. The draft and its status key are
    /// stored together. An error from `edit` leaves the slot unchanged.
    async fn update_track_draft(
        &self,
        track: Track,
        edit: TrackDraftEdit<'_>,
    ) -> Result<Draft, CoreError>;

    async fn load_track_status(&self, track: Track) -> StoreResult<Option<WorkflowStatus>>;

    async fn load_progress(&self, track: Track) -> StoreResult<Option<u32>>;

    async fn save_progress(&self, track: Track, step: u32) -> StoreResult<()>;

    /// Remove the draft, status and progress of a slot.
    async fn clear_track(&self, track: Track) -> StoreResult<()>;

    // ---- Dossiers ----

    /// Insert a dossier and record its initial workflow status.
    async fn insert_dossier(&self, input: NewDossier) -> StoreResult<DossierRecord>;

    async fn find_dossier(&self, id: DbId) -> StoreResult<Option<DossierRecord>>;

    /// Read-modify-write of a dossier's draft while the dossier is held.
    ///
    /// When the workflow status changes, a [`StatusEvent`] stamped `at` is
    /// appended in the same write unless it repeats the last recorded status.
    /// Returns `Ok(None)` if the dossier does not exist. An error from `edit`
    /// leaves the dossier unchanged.
    async fn update_draft(
        &self,
        id: DbId,
        at: Timestamp,
        edit: DraftEdit<'_>,
    ) -> Result<Option<DraftChange>, CoreError>;

    /// Returns `false` if the dossier does not exist.
    async fn save_dossier_progress(&self, id: DbId, step: u32) -> StoreResult<bool>;

    async fn list_dossiers_by_owner(&self, owner_id: DbId) -> StoreResult<Vec<DossierRecord>>;

    async fn list_all_dossiers(&self) -> StoreResult<Vec<DossierRecord>>;

    // ---- Status history ----

    /// Events in insertion order.
    async fn status_history(&self, dossier_id: DbId) -> StoreResult<Vec<StatusEvent>>;

    // ---- Messages ----

    /// Messages in insertion order.
    async fn list_messages(&self, dossier_id: DbId) -> StoreResult<Vec<Message>>;

    async fn insert_message(&self, input: NewMessage) -> StoreResult<Message>;

    // ---- Promo codes ----

    async fn upsert_promo(&self, promo: &PromoCode) -> StoreResult<PromoCode>;

    /// Lookup by normalized code.
    async fn find_promo(&self, code: &str) -> StoreResult<Option<PromoCode>>;

    async fn list_promos(&self) -> StoreResult<Vec<PromoCode>>;
}
