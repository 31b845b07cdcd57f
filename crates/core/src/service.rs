//! Dossier operations on top of a [`DossierStore`].
//!
//! Every read upgrades the stored draft and recomputes client visibility.
//! Every write is an edit closure handed to the store, which runs it against
//! the current stored draft while holding the record. A client write runs
//! [`merge_client_draft`] inside that closure, so an admin write that lands
//! first is never overwritten with stale values.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::defaults::{blank_draft, upgrade_draft};
use crate::draft::{Draft, Track, WorkflowStatus};
use crate::error::CoreError;
use crate::history::StatusEvent;
use crate::lifecycle::{self, validate_workflow_transition};
use crate::message::{Message, NewMessage, Sender};
use crate::payment::PaymentCompleted;
use crate::promo::{
    apply_promo_to_amount_eur, normalize_code, validate_promo, PriceBreakdown, PromoCode,
    TrackPricing,
};
use crate::roles::Identity;
use crate::sanitize::merge_client_draft;
use crate::stages::{StageId, StageStatus};
use crate::store::{DossierRecord, DossierStore, DraftChange, NewDossier};
use crate::summary::{filter_by_status, sort_by_recency, DossierSummary};
use crate::types::{DbId, Timestamp};
use crate::validation::{validate_step, FieldViolation, OnboardingStep};
use crate::visibility::{newly_visible, visible_stages};

// ---------------------------------------------------------------------------
// Views and outcomes
// ---------------------------------------------------------------------------

/// A dossier as served to clients and admins: upgraded draft plus the stages
/// the client can currently see.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DossierView {
    pub id: DbId,
    pub owner_id: DbId,
    pub owner_email: String,
    pub progress: Option<u32>,
    pub created_at: Timestamp,
    pub draft: Draft,
    pub visible_stages: Vec<StageId>,
}

impl DossierView {
    pub fn from_record(record: DossierRecord) -> Self {
        let draft = upgrade_draft(record.draft);
        let visible = client_visible_stages(&draft);
        Self {
            id: record.id,
            owner_id: record.owner_id,
            owner_email: record.owner_email,
            progress: record.progress,
            created_at: record.created_at,
            draft,
            visible_stages: visible,
        }
    }

    pub fn summary(&self) -> DossierSummary {
        DossierSummary::from_draft(Some(self.id), &self.draft)
    }
}

/// A local track slot as served to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSlotView {
    #[serde(rename = "type")]
    pub track: Track,
    /// Index of the next onboarding step to show.
    pub progress: u32,
    pub draft: Draft,
    pub visible_stages: Vec<StageId>,
}

impl TrackSlotView {
    fn new(draft: Draft, progress: Option<u32>) -> Self {
        let draft = upgrade_draft(draft);
        Self {
            track: draft.track,
            progress: progress.unwrap_or(0),
            visible_stages: client_visible_stages(&draft),
            draft,
        }
    }
}

/// Client-visible stages of an upgraded draft. Empty for the PP track.
pub fn client_visible_stages(draft: &Draft) -> Vec<StageId> {
    draft
        .srl()
        .map(|srl| visible_stages(srl).into_iter().collect())
        .unwrap_or_default()
}

/// Result of an admin write.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminUpdate {
    pub view: DossierView,
    /// Stages that became visible to the client with this write.
    pub unlocked: Vec<StageId>,
    /// New workflow status, when it changed.
    pub status_changed: Option<WorkflowStatus>,
}

/// Result of a save-and-advance request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvanceOutcome {
    pub advanced: bool,
    pub progress: u32,
    pub violations: Vec<FieldViolation>,
}

/// Result of a payment notification.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOutcome {
    pub view: DossierView,
    pub created: bool,
    pub changed: bool,
    /// New workflow status, when the payment moved it.
    pub status_changed: Option<WorkflowStatus>,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct DossierService {
    store: Arc<dyn DossierStore>,
    pricing: TrackPricing,
}

impl DossierService {
    pub fn new(store: Arc<dyn DossierStore>, pricing: TrackPricing) -> Self {
        Self { store, pricing }
    }

    pub fn store(&self) -> &Arc<dyn DossierStore> {
        &self.store
    }

    pub fn pricing(&self) -> TrackPricing {
        self.pricing
    }

    fn now() -> Timestamp {
        Utc::now()
    }

    // ---- Loading ----

    async fn load(&self, id: DbId) -> Result<DossierRecord, CoreError> {
        self.store
            .find_dossier(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Dossier",
                id,
            })
    }

    /// Load a dossier owned by `identity`. A foreign dossier is reported as
    /// missing.
    async fn load_owned(&self, identity: &Identity, id: DbId) -> Result<DossierRecord, CoreError> {
        let record = self.load(id).await?;
        if record.owner_id != identity.id {
            tracing::debug!(dossier_id = id, user_id = identity.id, "Dossier owned by another user");
            return Err(CoreError::NotFound {
                entity: "Dossier",
                id,
            });
        }
        Ok(record)
    }

    /// Apply `edit` to the upgraded stored draft and stamp the result, in one
    /// store write.
    async fn edit_draft<F>(&self, id: DbId, edit: F) -> Result<DraftChange, CoreError>
    where
        F: FnOnce(Draft) -> Result<Draft, CoreError> + Send + 'static,
    {
        let now = Self::now();
        self.store
            .update_draft(
                id,
                now,
                Box::new(move |record: &DossierRecord| {
                    let mut next = edit(upgrade_draft(record.draft.clone()))?;
                    next.touch(now);
                    Ok(next)
                }),
            )
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Dossier",
                id,
            })
    }

    // ---- Client ----

    pub async fn create_dossier(
        &self,
        identity: &Identity,
        track: Track,
    ) -> Result<DossierView, CoreError> {
        let now = Self::now();
        let record = self
            .store
            .insert_dossier(NewDossier {
                owner_id: identity.id,
                owner_email: identity.email.clone(),
                draft: blank_draft(track, now),
                created_at: now,
            })
            .await?;

        tracing::info!(dossier_id = record.id, user_id = identity.id, track = track.as_str(), "Dossier created");
        Ok(DossierView::from_record(record))
    }

    pub async fn get_dossier(
        &self,
        identity: &Identity,
        id: DbId,
    ) -> Result<DossierView, CoreError> {
        Ok(DossierView::from_record(self.load_owned(identity, id).await?))
    }

    /// Client write. Admin-owned values in `incoming` are replaced by the
    /// stored ones before saving.
    pub async fn client_update(
        &self,
        identity: &Identity,
        id: DbId,
        incoming: Draft,
    ) -> Result<DossierView, CoreError> {
        self.load_owned(identity, id).await?;
        let incoming = upgrade_draft(incoming);

        let change = self
            .edit_draft(id, move |existing| Ok(merge_client_draft(&existing, incoming)))
            .await?;
        Ok(DossierView::from_record(change.after))
    }

    /// Optionally save the client's draft, then validate `step` and move the
    /// stored progress forward when it passes.
    pub async fn advance(
        &self,
        identity: &Identity,
        id: DbId,
        step: OnboardingStep,
        incoming: Option<Draft>,
    ) -> Result<AdvanceOutcome, CoreError> {
        let view = match incoming {
            Some(draft) => self.client_update(identity, id, draft).await?,
            None => self.get_dossier(identity, id).await?,
        };

        let outcome = evaluate_advance(step, &view.draft, view.progress);
        if outcome.advanced && Some(outcome.progress) != view.progress {
            self.store.save_dossier_progress(id, outcome.progress).await?;
        }
        Ok(outcome)
    }

    pub async fn list_for_owner(
        &self,
        identity: &Identity,
        status: Option<WorkflowStatus>,
    ) -> Result<Vec<DossierSummary>, CoreError> {
        let records = self.store.list_dossiers_by_owner(identity.id).await?;
        Ok(summarize(records, status))
    }

    pub async fn history(
        &self,
        identity: &Identity,
        id: DbId,
    ) -> Result<Vec<StatusEvent>, CoreError> {
        self.load_owned(identity, id).await?;
        Ok(self.store.status_history(id).await?)
    }

    pub async fn messages(&self, identity: &Identity, id: DbId) -> Result<Vec<Message>, CoreError> {
        self.load_owned(identity, id).await?;
        Ok(self.store.list_messages(id).await?)
    }

    pub async fn post_client_message(
        &self,
        identity: &Identity,
        id: DbId,
        text: &str,
    ) -> Result<Message, CoreError> {
        self.load_owned(identity, id).await?;
        let input = NewMessage::new(id, Sender::Client, text, Self::now())?;
        Ok(self.store.insert_message(input).await?)
    }

    // ---- Admin ----

    pub async fn admin_get(&self, id: DbId) -> Result<DossierView, CoreError> {
        Ok(DossierView::from_record(self.load(id).await?))
    }

    pub async fn admin_history(&self, id: DbId) -> Result<Vec<StatusEvent>, CoreError> {
        self.load(id).await?;
        Ok(self.store.status_history(id).await?)
    }

    pub async fn admin_messages(&self, id: DbId) -> Result<Vec<Message>, CoreError> {
        self.load(id).await?;
        Ok(self.store.list_messages(id).await?)
    }

    pub async fn list_all(
        &self,
        status: Option<WorkflowStatus>,
    ) -> Result<Vec<DossierSummary>, CoreError> {
        let records = self.store.list_all_dossiers().await?;
        Ok(summarize(records, status))
    }

    /// Admin write of a full draft. Only the track is forced; the workflow
    /// status change, if any, must be a valid transition.
    pub async fn admin_update(&self, id: DbId, incoming: Draft) -> Result<AdminUpdate, CoreError> {
        let incoming = upgrade_draft(incoming);
        self.admin_edit(id, move |existing| {
            let mut next = incoming;
            next.track = existing.track;
            if next.track == Track::Pp {
                next.workflow.srl = None;
            }
            validate_workflow_transition(existing.status(), next.status())?;
            Ok(next)
        })
        .await
    }

    pub async fn set_workflow_status(
        &self,
        id: DbId,
        status: WorkflowStatus,
    ) -> Result<AdminUpdate, CoreError> {
        self.admin_edit(id, move |mut draft| {
            validate_workflow_transition(draft.status(), status)?;
            draft.set_status(status);
            Ok(draft)
        })
        .await
    }

    /// Set one stage's status, and its admin note when `admin_note` is given.
    /// An empty note clears it.
    pub async fn set_stage_status(
        &self,
        id: DbId,
        stage: StageId,
        status: StageStatus,
        admin_note: Option<String>,
    ) -> Result<AdminUpdate, CoreError> {
        self.admin_edit(id, move |mut draft| {
            apply_stage_status(&mut draft, stage, status, admin_note)?;
            Ok(draft)
        })
        .await
    }

    async fn admin_edit<F>(&self, id: DbId, edit: F) -> Result<AdminUpdate, CoreError>
    where
        F: FnOnce(Draft) -> Result<Draft, CoreError> + Send + 'static,
    {
        let change = self.edit_draft(id, edit).await?;
        let before = upgrade_draft(change.before.draft);
        let view = DossierView::from_record(change.after);

        let unlocked = match (before.srl(), view.draft.srl()) {
            (Some(before), Some(after)) => newly_visible(before, after),
            _ => Vec::new(),
        };
        let status = view.draft.status();
        let status_changed = (status != before.status()).then_some(status);

        tracing::info!(
            dossier_id = id,
            unlocked = unlocked.len(),
            status = status.as_str(),
            "Dossier updated by admin"
        );
        Ok(AdminUpdate {
            view,
            unlocked,
            status_changed,
        })
    }

    pub async fn post_admin_message(&self, id: DbId, text: &str) -> Result<Message, CoreError> {
        self.load(id).await?;
        let input = NewMessage::new(id, Sender::Admin, text, Self::now())?;
        Ok(self.store.insert_message(input).await?)
    }

    // ---- Payment ----

    /// Apply a completed payment. The dossier is the one named by the
    /// notification, else the customer's most recent dossier on that track,
    /// else a new one.
    pub async fn complete_payment(
        &self,
        event: &PaymentCompleted,
    ) -> Result<PaymentOutcome, CoreError> {
        let (record, created) = self.resolve_paid_dossier(event).await?;
        let id = record.id;
        let now = Self::now();

        let change = self
            .store
            .update_draft(
                id,
                now,
                Box::new(move |current: &DossierRecord| {
                    Ok(lifecycle::complete_payment(current.draft.clone(), now)?.draft)
                }),
            )
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Dossier",
                id,
            })?;
        let changed = change.after.draft != change.before.draft;
        let status = change.after.draft.status();
        let status_changed = (status != change.before.draft.status()).then_some(status);

        tracing::info!(
            dossier_id = id,
            customer_id = event.customer.id,
            created,
            changed,
            "Payment applied"
        );
        Ok(PaymentOutcome {
            view: DossierView::from_record(change.after),
            created,
            changed,
            status_changed,
        })
    }

    async fn resolve_paid_dossier(
        &self,
        event: &PaymentCompleted,
    ) -> Result<(DossierRecord, bool), CoreError> {
        let customer = &event.customer;

        if let Some(id) = event.dossier_id {
            let record = self.load(id).await?;
            if record.owner_id != customer.id {
                return Err(CoreError::NotFound {
                    entity: "Dossier",
                    id,
                });
            }
            if record.draft.track != event.track {
                return Err(CoreError::Validation(format!(
                    "Dossier {id} is not a {} dossier",
                    event.track.as_str()
                )));
            }
            return Ok((record, false));
        }

        let latest = self
            .store
            .list_dossiers_by_owner(customer.id)
            .await?
            .into_iter()
            .filter(|r| r.draft.track == event.track)
            .max_by_key(|r| r.draft.updated_at());
        if let Some(record) = latest {
            return Ok((record, false));
        }

        let now = Self::now();
        let record = self
            .store
            .insert_dossier(NewDossier {
                owner_id: customer.id,
                owner_email: customer.email.clone(),
                draft: blank_draft(event.track, now),
                created_at: now,
            })
            .await?;
        Ok((record, true))
    }

    // ---- Promo codes and pricing ----

    pub async fn upsert_promo(&self, promo: PromoCode) -> Result<PromoCode, CoreError> {
        let promo = validate_promo(promo)?;
        let saved = self.store.upsert_promo(&promo).await?;
        tracing::info!(code = %saved.code, active = saved.active, "Promo code saved");
        Ok(saved)
    }

    pub async fn list_promos(&self) -> Result<Vec<PromoCode>, CoreError> {
        Ok(self.store.list_promos().await?)
    }

    /// Price of a track, with an optional promo code applied.
    pub async fn quote(&self, track: Track, code: Option<&str>) -> Result<PriceBreakdown, CoreError> {
        let base = self.pricing.base_for(track);
        let code = code.map(normalize_code).filter(|c| !c.is_empty());
        let Some(code) = code else {
            return Ok(apply_promo_to_amount_eur(base, None));
        };

        match self.store.find_promo(&code).await? {
            Some(promo) if promo.active => Ok(apply_promo_to_amount_eur(base, Some(&promo))),
            _ => Err(CoreError::Validation(format!(
                "Promo code '{code}' is not valid"
            ))),
        }
    }

    // ---- Local track slots ----

    /// The slot's draft, upgraded, or a blank one when the slot is empty.
    pub async fn load_local(&self, track: Track) -> Result<TrackSlotView, CoreError> {
        let draft = match self.store.load_track_draft(track).await? {
            Some(draft) => draft,
            None => blank_draft(track, Self::now()),
        };
        let progress = self.store.load_progress(track).await?;
        Ok(TrackSlotView::new(draft, progress))
    }

    /// Client write to a slot, through the same merge as owned dossiers.
    pub async fn save_local(
        &self,
        track: Track,
        incoming: Draft,
    ) -> Result<TrackSlotView, CoreError> {
        let incoming = upgrade_draft(incoming);
        let saved = self
            .edit_local(track, move |existing| Ok(merge_client_draft(&existing, incoming)))
            .await?;
        let progress = self.store.load_progress(track).await?;
        Ok(TrackSlotView::new(saved, progress))
    }

    /// Admin stage write on a slot, under the same rules as
    /// [`Self::set_stage_status`].
    pub async fn set_local_stage_status(
        &self,
        track: Track,
        stage: StageId,
        status: StageStatus,
        admin_note: Option<String>,
    ) -> Result<TrackSlotView, CoreError> {
        let saved = self
            .edit_local(track, move |mut draft| {
                apply_stage_status(&mut draft, stage, status, admin_note)?;
                Ok(draft)
            })
            .await?;
        tracing::info!(
            track = track.as_str(),
            stage = stage.key(),
            status = status.as_str(),
            "Local dossier updated by admin"
        );

        let progress = self.store.load_progress(track).await?;
        Ok(TrackSlotView::new(saved, progress))
    }

    async fn edit_local<F>(&self, track: Track, edit: F) -> Result<Draft, CoreError>
    where
        F: FnOnce(Draft) -> Result<Draft, CoreError> + Send + 'static,
    {
        let now = Self::now();
        self.store
            .update_track_draft(
                track,
                Box::new(move |stored: Option<Draft>| {
                    let existing = match stored {
                        Some(draft) => upgrade_draft(draft),
                        None => blank_draft(track, now),
                    };
                    let mut next = edit(existing)?;
                    next.touch(now);
                    Ok(next)
                }),
            )
            .await
    }

    pub async fn reset_local(&self, track: Track) -> Result<(), CoreError> {
        self.store.clear_track(track).await?;
        tracing::info!(track = track.as_str(), "Local dossier reset");
        Ok(())
    }

    pub async fn local_progress(&self, track: Track) -> Result<u32, CoreError> {
        Ok(self.store.load_progress(track).await?.unwrap_or(0))
    }

    pub async fn save_local_progress(&self, track: Track, step: u32) -> Result<u32, CoreError> {
        let step = OnboardingStep::from_index(step)?.index();
        self.store.save_progress(track, step).await?;
        Ok(step)
    }

    pub async fn advance_local(
        &self,
        track: Track,
        step: OnboardingStep,
        incoming: Option<Draft>,
    ) -> Result<AdvanceOutcome, CoreError> {
        let slot = match incoming {
            Some(draft) => self.save_local(track, draft).await?,
            None => self.load_local(track).await?,
        };
        let stored = self.store.load_progress(track).await?;

        let outcome = evaluate_advance(step, &slot.draft, stored);
        if outcome.advanced && Some(outcome.progress) != stored {
            self.store.save_progress(track, outcome.progress).await?;
        }
        Ok(outcome)
    }

    /// Summaries of the slots that hold a draft, most recent first.
    pub async fn list_local(&self) -> Result<Vec<DossierSummary>, CoreError> {
        let mut summaries = Vec::new();
        for track in Track::ALL {
            let Some(draft) = self.store.load_track_draft(track).await? else {
                continue;
            };
            let stored = self.store.load_track_status(track).await?;
            summaries.push(DossierSummary::from_track_slot(&draft, stored));
        }
        sort_by_recency(&mut summaries);
        Ok(summaries)
    }
}

/// Set one stage of an upgraded draft. Backward moves are allowed and logged.
fn apply_stage_status(
    draft: &mut Draft,
    stage: StageId,
    status: StageStatus,
    admin_note: Option<String>,
) -> Result<(), CoreError> {
    let srl = draft.srl_mut().ok_or_else(|| {
        CoreError::Validation("This dossier has no processing stages".to_string())
    })?;

    let previous = srl.status_of(stage);
    if previous != status && !previous.is_forward_transition(status) {
        tracing::info!(
            stage = stage.key(),
            from = previous.as_str(),
            to = status.as_str(),
            "Stage moved backwards"
        );
    }
    srl.set_status(stage, status);
    if let Some(note) = admin_note {
        let note = note.trim().to_string();
        srl.set_admin_note(stage, (!note.is_empty()).then_some(note));
    }
    Ok(())
}

fn summarize(records: Vec<DossierRecord>, status: Option<WorkflowStatus>) -> Vec<DossierSummary> {
    let summaries = records
        .into_iter()
        .map(|r| DossierSummary::from_draft(Some(r.id), &upgrade_draft(r.draft)))
        .collect();
    let mut summaries = filter_by_status(summaries, status);
    sort_by_recency(&mut summaries);
    summaries
}

/// Validate `step` and compute the progress to store. Progress never moves
/// backwards and stops at the last step. A step past the stored progress is
/// refused, so no step is skipped.
fn evaluate_advance(step: OnboardingStep, draft: &Draft, stored: Option<u32>) -> AdvanceOutcome {
    let current = stored.unwrap_or(0);
    if step.index() > current {
        return AdvanceOutcome {
            advanced: false,
            progress: current,
            violations: vec![FieldViolation::new(
                "step",
                "Terminez d'abord les étapes précédentes",
            )],
        };
    }
    let violations = validate_step(step, draft);
    if !violations.is_empty() {
        return AdvanceOutcome {
            advanced: false,
            progress: current,
            violations,
        };
    }
    let last = OnboardingStep::Recap.index();
    AdvanceOutcome {
        advanced: true,
        progress: current.max((step.index() + 1).min(last)),
        violations,
    }
}
