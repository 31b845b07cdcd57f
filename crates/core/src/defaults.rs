//! Blank drafts and schema upgrade of stored drafts.
//!
//! Stored drafts may predate stage fields introduced later. Missing keys are
//! already filled with empty values by the serde container defaults; the
//! reducers below then backfill the fields whose default is not empty
//! (proposal placeholders, amounts, delivery window). Stored values always
//! win over defaults.

use crate::draft::{Draft, Meta, MetaStatus, Track, Workflow, WorkflowStatus};
use crate::stages::{
    AccountantProposal, AffiliationStage, BanqueStage, ComptableStage, DomiciliationStage,
    DossierStage, FactureNotaireStage, FinalDeliveryStage, NotaireStage, NumeroEntrepriseStage,
    PlanFinancierStage, RendezVousStage, SrlWorkflow, StageId, TvaStage,
};
use crate::types::Timestamp;

/// Social insurance affiliation fee charged by default, in EUR.
pub const DEFAULT_AFFILIATION_AMOUNT_EUR: f64 = 190.0;

/// Days the final archive stays downloadable.
pub const DEFAULT_FINAL_DELIVERY_DAYS: u32 = 30;

/// Number of accountant proposals shown before the operator fills them in.
pub const DEFAULT_PROPOSAL_COUNT: usize = 3;

// ---------------------------------------------------------------------------
// Blank values
// ---------------------------------------------------------------------------

/// A fully populated blank draft for `track`.
pub fn blank_draft(track: Track, now: Timestamp) -> Draft {
    Draft {
        track,
        meta: Meta {
            status: MetaStatus::Draft,
            updated_at: now,
            promo_code: None,
        },
        identite: Default::default(),
        adresse: Default::default(),
        activite: Default::default(),
        specifics: Default::default(),
        capital_advisor: Default::default(),
        docs: Default::default(),
        workflow: Workflow {
            status: Some(WorkflowStatus::New),
            srl: match track {
                Track::Srl => Some(default_srl_workflow()),
                Track::Pp => None,
            },
        },
    }
}

/// Every SRL stage in its initial `pending` shape.
pub fn default_srl_workflow() -> SrlWorkflow {
    SrlWorkflow {
        dossier: DossierStage::default(),
        plan_financier: PlanFinancierStage::default(),
        banque: BanqueStage::default(),
        domiciliation: DomiciliationStage::default(),
        comptable: default_comptable(),
        notaire: NotaireStage::default(),
        rendez_vous: RendezVousStage::default(),
        facture_notaire: FactureNotaireStage::default(),
        numero_entreprise: NumeroEntrepriseStage::default(),
        tva: TvaStage::default(),
        affiliation: default_affiliation(),
        final_delivery: default_final_delivery(),
    }
}

/// Placeholder proposals `proposal-1` .. `proposal-3`.
pub fn placeholder_proposals() -> Vec<AccountantProposal> {
    (1..=DEFAULT_PROPOSAL_COUNT)
        .map(|n| AccountantProposal {
            id: format!("proposal-{n}"),
            ..Default::default()
        })
        .collect()
}

fn default_comptable() -> ComptableStage {
    ComptableStage {
        proposals: Some(placeholder_proposals()),
        ..Default::default()
    }
}

fn default_affiliation() -> AffiliationStage {
    AffiliationStage {
        amount_due: Some(DEFAULT_AFFILIATION_AMOUNT_EUR),
        ..Default::default()
    }
}

fn default_final_delivery() -> FinalDeliveryStage {
    FinalDeliveryStage {
        available_days: Some(DEFAULT_FINAL_DELIVERY_DAYS),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Upgrade
// ---------------------------------------------------------------------------

/// Bring a stored draft up to the current stage shape.
///
/// A missing workflow status becomes `new`. SRL drafts get a workflow record
/// if they have none, and each stage is passed through its reducer.
/// `upgrade_draft(upgrade_draft(d)) == upgrade_draft(d)`.
pub fn upgrade_draft(mut draft: Draft) -> Draft {
    draft.workflow.status.get_or_insert(WorkflowStatus::New);
    if draft.track != Track::Srl {
        return draft;
    }

    let stored = draft.workflow.srl.take().unwrap_or_default();
    draft.workflow.srl = Some(upgrade_srl_workflow(stored));
    draft
}

/// Apply the per-stage reducer of every stage.
pub fn upgrade_srl_workflow(mut srl: SrlWorkflow) -> SrlWorkflow {
    for id in StageId::ALL {
        upgrade_stage(&mut srl, id);
    }
    srl
}

/// Reducer for one stage: fill fields the stored stage lacks from its default.
fn upgrade_stage(srl: &mut SrlWorkflow, id: StageId) {
    match id {
        StageId::Comptable => {
            let default = default_comptable();
            backfill(&mut srl.comptable.proposals, default.proposals);
        }
        StageId::Affiliation => {
            let default = default_affiliation();
            backfill(&mut srl.affiliation.amount_due, default.amount_due);
        }
        StageId::FinalDelivery => {
            let default = default_final_delivery();
            backfill(&mut srl.final_delivery.available_days, default.available_days);
        }
        // Remaining stages have only empty defaults, which serde already
        // supplies for missing keys.
        StageId::Dossier
        | StageId::PlanFinancier
        | StageId::Banque
        | StageId::Domiciliation
        | StageId::Notaire
        | StageId::RendezVous
        | StageId::FactureNotaire
        | StageId::NumeroEntreprise
        | StageId::Tva => {}
    }
}

fn backfill<T>(slot: &mut Option<T>, default: Option<T>) {
    if slot.is_none() {
        *slot = default;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::stages::StageStatus;

    fn now() -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn blank_srl_draft_has_every_stage_pending() {
        let draft = blank_draft(Track::Srl, now());
        let srl = draft.srl().expect("srl workflow present");
        for (_, status) in srl.statuses() {
            assert_eq!(status, StageStatus::Pending);
        }
        assert_eq!(draft.status(), WorkflowStatus::New);
        assert_eq!(draft.meta.status, MetaStatus::Draft);
    }

    #[test]
    fn blank_srl_draft_carries_track_defaults() {
        let draft = blank_draft(Track::Srl, now());
        let srl = draft.srl().unwrap();
        assert_eq!(srl.comptable.proposals.as_ref().unwrap().len(), 3);
        assert_eq!(srl.affiliation.amount_due, Some(190.0));
        assert_eq!(srl.final_delivery.available_days, Some(30));
    }

    #[test]
    fn blank_pp_draft_has_no_stage_record() {
        let draft = blank_draft(Track::Pp, now());
        assert!(draft.srl().is_none());
    }

    #[test]
    fn upgrade_backfills_fields_missing_from_old_draft() {
        let old: Draft = serde_json::from_value(serde_json::json!({
            "type": "srl",
            "meta": { "updatedAt": "2025-11-02T08:00:00Z" },
            "workflow": {
                "status": "in_progress",
                "srl": {
                    "dossier": { "status": "done" },
                    "banque": { "status": "incomplete", "adminNote": "Missing stamp" }
                }
            }
        }))
        .unwrap();

        let upgraded = upgrade_draft(old);
        let srl = upgraded.srl().unwrap();

        assert_eq!(srl.dossier.status, StageStatus::Done);
        assert_eq!(srl.banque.status, StageStatus::Incomplete);
        assert_eq!(srl.banque.admin_note.as_deref(), Some("Missing stamp"));
        assert_eq!(srl.comptable.proposals.as_ref().unwrap().len(), 3);
        assert_eq!(srl.affiliation.amount_due, Some(190.0));
        assert_eq!(srl.final_delivery.available_days, Some(30));
    }

    #[test]
    fn upgrade_keeps_stored_values_over_defaults() {
        let mut draft = blank_draft(Track::Srl, now());
        {
            let srl = draft.srl_mut().unwrap();
            srl.affiliation.amount_due = Some(240.0);
            srl.final_delivery.available_days = Some(60);
            srl.comptable.proposals = Some(vec![]);
        }

        let upgraded = upgrade_draft(draft);
        let srl = upgraded.srl().unwrap();
        assert_eq!(srl.affiliation.amount_due, Some(240.0));
        assert_eq!(srl.final_delivery.available_days, Some(60));
        assert_eq!(srl.comptable.proposals, Some(vec![]));
    }

    #[test]
    fn upgrade_materializes_missing_srl_record() {
        let mut draft = blank_draft(Track::Srl, now());
        draft.workflow.srl = None;

        let upgraded = upgrade_draft(draft);
        assert_eq!(upgraded.srl(), Some(&default_srl_workflow()));
    }

    #[test]
    fn upgrade_leaves_pp_draft_untouched() {
        let draft = blank_draft(Track::Pp, now());
        assert_eq!(upgrade_draft(draft.clone()), draft);
    }

    #[test]
    fn upgrade_is_idempotent() {
        let stored: Draft = serde_json::from_value(serde_json::json!({
            "type": "srl",
            "meta": { "updatedAt": "2025-11-02T08:00:00Z" },
            "workflow": { "srl": { "tva": { "status": "done", "vatNumber": "BE0123" } } }
        }))
        .unwrap();

        let once = upgrade_draft(stored);
        let twice = upgrade_draft(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn upgrade_fills_missing_workflow_status() {
        let stored: Draft = serde_json::from_value(serde_json::json!({
            "type": "pp",
            "meta": { "updatedAt": "2025-11-02T08:00:00Z" }
        }))
        .unwrap();
        assert_eq!(stored.workflow.status, None);

        let upgraded = upgrade_draft(stored);
        assert_eq!(upgraded.workflow.status, Some(WorkflowStatus::New));
    }
}
