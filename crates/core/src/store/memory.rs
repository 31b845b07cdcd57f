//! In-memory [`DossierStore`], used for the local flow and in tests.
//!
//! Data lives for the lifetime of the process.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    DossierRecord, DossierStore, DraftChange, DraftEdit, NewDossier, StoreResult, TrackDraftEdit,
};
use crate::draft::{Draft, Track, WorkflowStatus};
use crate::error::CoreError;
use crate::history::{record_status, StatusEvent};
use crate::message::{Message, NewMessage};
use crate::promo::PromoCode;
use crate::types::{DbId, Timestamp};

#[derive(Debug, Default, Clone)]
struct TrackSlot {
    draft: Option<Draft>,
    status: Option<WorkflowStatus>,
    progress: Option<u32>,
}

/// Thread-safe in-memory store.
///
/// Writers that touch both dossiers and history take the `dossiers` lock
/// first.
#[derive(Clone, Default)]
pub struct MemoryStore {
    slots: Arc<RwLock<HashMap<Track, TrackSlot>>>,
    dossiers: Arc<RwLock<BTreeMap<DbId, DossierRecord>>>,
    history: Arc<RwLock<HashMap<DbId, Vec<StatusEvent>>>>,
    messages: Arc<RwLock<HashMap<DbId, Vec<Message>>>>,
    promos: Arc<RwLock<BTreeMap<String, PromoCode>>>,
    next_dossier_id: Arc<AtomicI64>,
    next_message_id: Arc<AtomicI64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(counter: &AtomicI64) -> DbId {
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl DossierStore for MemoryStore {
    async fn load_track_draft(&self, track: Track) -> StoreResult<Option<Draft>> {
        let slots = self.slots.read().await;
        Ok(slots.get(&track).and_then(|s| s.draft.clone()))
    }

    async fn update_track_draft(
        &self,
        track: Track,
        edit: TrackDraftEdit<'_>,
    ) -> Result<Draft, CoreError> {
        let mut slots = self.slots.write().await;
        let current = slots.get(&track).and_then(|s| s.draft.clone());
        let next = edit(current)?;

        let slot = slots.entry(track).or_default();
        slot.status = Some(next.status());
        slot.draft = Some(next.clone());
        Ok(next)
    }

    async fn load_track_status(&self, track: Track) -> StoreResult<Option<WorkflowStatus>> {
        let slots = self.slots.read().await;
        Ok(slots.get(&track).and_then(|s| s.status))
    }

    async fn load_progress(&self, track: Track) -> StoreResult<Option<u32>> {
        let slots = self.slots.read().await;
        Ok(slots.get(&track).and_then(|s| s.progress))
    }

    async fn save_progress(&self, track: Track, step: u32) -> StoreResult<()> {
        let mut slots = self.slots.write().await;
        slots.entry(track).or_default().progress = Some(step);
        Ok(())
    }

    async fn clear_track(&self, track: Track) -> StoreResult<()> {
        self.slots.write().await.remove(&track);
        Ok(())
    }

    async fn insert_dossier(&self, input: NewDossier) -> StoreResult<DossierRecord> {
        let record = DossierRecord {
            id: Self::next_id(&self.next_dossier_id),
            owner_id: input.owner_id,
            owner_email: input.owner_email,
            draft: input.draft,
            progress: None,
            created_at: input.created_at,
        };
        let mut dossiers = self.dossiers.write().await;
        let mut history = self.history.write().await;
        record_status(
            history.entry(record.id).or_default(),
            record.draft.status(),
            record.created_at,
        );
        dossiers.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_dossier(&self, id: DbId) -> StoreResult<Option<DossierRecord>> {
        Ok(self.dossiers.read().await.get(&id).cloned())
    }

    async fn update_draft(
        &self,
        id: DbId,
        at: Timestamp,
        edit: DraftEdit<'_>,
    ) -> Result<Option<DraftChange>, CoreError> {
        let mut dossiers = self.dossiers.write().await;
        let Some(record) = dossiers.get_mut(&id) else {
            return Ok(None);
        };
        let before = record.clone();
        let next = edit(&before)?;

        if next.status() != before.draft.status() {
            let mut history = self.history.write().await;
            record_status(history.entry(id).or_default(), next.status(), at);
        }
        record.draft = next;
        Ok(Some(DraftChange {
            before,
            after: record.clone(),
        }))
    }

    async fn save_dossier_progress(&self, id: DbId, step: u32) -> StoreResult<bool> {
        let mut dossiers = self.dossiers.write().await;
        Ok(dossiers
            .get_mut(&id)
            .map(|record| record.progress = Some(step))
            .is_some())
    }

    async fn list_dossiers_by_owner(&self, owner_id: DbId) -> StoreResult<Vec<DossierRecord>> {
        let dossiers = self.dossiers.read().await;
        Ok(dossiers
            .values()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_all_dossiers(&self) -> StoreResult<Vec<DossierRecord>> {
        Ok(self.dossiers.read().await.values().cloned().collect())
    }

    async fn status_history(&self, dossier_id: DbId) -> StoreResult<Vec<StatusEvent>> {
        let history = self.history.read().await;
        Ok(history.get(&dossier_id).cloned().unwrap_or_default())
    }

    async fn list_messages(&self, dossier_id: DbId) -> StoreResult<Vec<Message>> {
        let messages = self.messages.read().await;
        Ok(messages.get(&dossier_id).cloned().unwrap_or_default())
    }

    async fn insert_message(&self, input: NewMessage) -> StoreResult<Message> {
        let message = Message {
            id: Self::next_id(&self.next_message_id),
            dossier_id: input.dossier_id,
            sender: input.sender,
            text: input.text,
            created_at: input.created_at,
        };
        let mut messages = self.messages.write().await;
        messages
            .entry(message.dossier_id)
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn upsert_promo(&self, promo: &PromoCode) -> StoreResult<PromoCode> {
        let mut promos = self.promos.write().await;
        promos.insert(promo.code.clone(), promo.clone());
        Ok(promo.clone())
    }

    async fn find_promo(&self, code: &str) -> StoreResult<Option<PromoCode>> {
        Ok(self.promos.read().await.get(code).cloned())
    }

    async fn list_promos(&self) -> StoreResult<Vec<PromoCode>> {
        Ok(self.promos.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    use super::*;
    use crate::defaults::blank_draft;
    use crate::message::Sender;
    use crate::promo::PromoType;

    fn now() -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2026, 3, 3, 9, 0, 0).unwrap()
    }

    fn new_dossier(owner_id: DbId) -> NewDossier {
        NewDossier {
            owner_id,
            owner_email: format!("owner{owner_id}@example.be"),
            draft: blank_draft(Track::Srl, now()),
            created_at: now(),
        }
    }

    fn replace_with(draft: Draft) -> TrackDraftEdit<'static> {
        Box::new(move |_| Ok(draft))
    }

    #[tokio::test]
    async fn track_slot_round_trip_and_clear() {
        let store = MemoryStore::new();
        let mut draft = blank_draft(Track::Pp, now());
        draft.set_status(WorkflowStatus::InProgress);

        store
            .update_track_draft(Track::Pp, replace_with(draft.clone()))
            .await
            .unwrap();
        store.save_progress(Track::Pp, 2).await.unwrap();

        assert_eq!(store.load_track_draft(Track::Pp).await.unwrap(), Some(draft));
        assert_eq!(
            store.load_track_status(Track::Pp).await.unwrap(),
            Some(WorkflowStatus::InProgress)
        );
        assert_eq!(store.load_progress(Track::Pp).await.unwrap(), Some(2));
        assert_eq!(store.load_track_draft(Track::Srl).await.unwrap(), None);

        store.clear_track(Track::Pp).await.unwrap();
        assert_eq!(store.load_track_draft(Track::Pp).await.unwrap(), None);
        assert_eq!(store.load_track_status(Track::Pp).await.unwrap(), None);
        assert_eq!(store.load_progress(Track::Pp).await.unwrap(), None);
    }

    #[tokio::test]
    async fn dossier_ids_increase_and_owner_filter_applies() {
        let store = MemoryStore::new();
        let a = store.insert_dossier(new_dossier(1)).await.unwrap();
        let b = store.insert_dossier(new_dossier(2)).await.unwrap();
        let c = store.insert_dossier(new_dossier(1)).await.unwrap();

        assert!(a.id < b.id && b.id < c.id);
        let owned = store.list_dossiers_by_owner(1).await.unwrap();
        assert_eq!(owned.iter().map(|d| d.id).collect::<Vec<_>>(), vec![a.id, c.id]);
        assert_eq!(store.list_all_dossiers().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn update_missing_dossier_returns_none() {
        let store = MemoryStore::new();
        let draft = blank_draft(Track::Srl, now());
        let change = store
            .update_draft(42, now(), Box::new(move |_| Ok(draft)))
            .await
            .unwrap();
        assert!(change.is_none());
    }

    #[tokio::test]
    async fn status_change_is_recorded_with_the_draft() {
        let store = MemoryStore::new();
        let d = store.insert_dossier(new_dossier(1)).await.unwrap();
        let to_in_progress = || -> DraftEdit<'static> {
            Box::new(|record: &DossierRecord| {
                let mut draft = record.draft.clone();
                draft.set_status(WorkflowStatus::InProgress);
                Ok(draft)
            })
        };

        let change = store
            .update_draft(d.id, now(), to_in_progress())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(change.before.draft.status(), WorkflowStatus::New);
        assert_eq!(change.after.draft.status(), WorkflowStatus::InProgress);
        store.update_draft(d.id, now(), to_in_progress()).await.unwrap();

        let statuses: Vec<_> = store
            .status_history(d.id)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.status)
            .collect();
        assert_eq!(statuses, vec![WorkflowStatus::New, WorkflowStatus::InProgress]);
    }

    #[tokio::test]
    async fn failed_edit_leaves_dossier_unchanged() {
        let store = MemoryStore::new();
        let d = store.insert_dossier(new_dossier(1)).await.unwrap();

        let result = store
            .update_draft(
                d.id,
                now(),
                Box::new(|_| Err(CoreError::Conflict("closed".into()))),
            )
            .await;
        assert_matches!(result, Err(CoreError::Conflict(_)));
        assert_eq!(store.find_dossier(d.id).await.unwrap(), Some(d));
    }

    #[tokio::test]
    async fn messages_keep_insertion_order() {
        let store = MemoryStore::new();
        let d = store.insert_dossier(new_dossier(1)).await.unwrap();
        for text in ["un", "deux"] {
            let msg = NewMessage::new(d.id, Sender::Client, text, now()).unwrap();
            store.insert_message(msg).await.unwrap();
        }
        let texts: Vec<_> = store
            .list_messages(d.id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, vec!["un", "deux"]);
    }

    #[tokio::test]
    async fn promo_upsert_replaces_by_code() {
        let store = MemoryStore::new();
        let mut promo = PromoCode {
            code: "LAUNCH".into(),
            promo_type: PromoType::Percent,
            value: 10.0,
            active: true,
            note: None,
        };
        store.upsert_promo(&promo).await.unwrap();
        promo.active = false;
        store.upsert_promo(&promo).await.unwrap();

        let promos = store.list_promos().await.unwrap();
        assert_eq!(promos.len(), 1);
        assert!(!store.find_promo("LAUNCH").await.unwrap().unwrap().active);
    }
}
