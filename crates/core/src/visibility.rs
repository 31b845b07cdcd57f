//! Client visibility gate for SRL stages.
//!
//! Computed from the current stage statuses on every read; nothing here is
//! persisted. The chain is sequential except for `domiciliation` and
//! `comptable`, which the client can always reach so they can be prepared
//! in parallel with the bank step.

use std::collections::BTreeSet;

use crate::stages::{SrlWorkflow, StageId};

/// Stages the client may currently see and act on.
pub fn visible_stages(srl: &SrlWorkflow) -> BTreeSet<StageId> {
    StageId::ALL
        .into_iter()
        .filter(|id| gate_open(srl, *id))
        .collect()
}

/// Whether a single stage is visible to the client.
pub fn is_visible(srl: &SrlWorkflow, id: StageId) -> bool {
    gate_open(srl, id)
}

/// Stages visible in `after` that were hidden in `before`.
pub fn newly_visible(before: &SrlWorkflow, after: &SrlWorkflow) -> Vec<StageId> {
    let was = visible_stages(before);
    visible_stages(after)
        .into_iter()
        .filter(|id| !was.contains(id))
        .collect()
}

fn gate_open(srl: &SrlWorkflow, id: StageId) -> bool {
    match id {
        StageId::Dossier => true,
        StageId::PlanFinancier => srl.is_done(StageId::Dossier),
        StageId::Banque => srl.is_done(StageId::PlanFinancier),
        StageId::Domiciliation | StageId::Comptable => true,
        StageId::Notaire => {
            srl.is_done(StageId::Banque)
                && srl.is_done(StageId::Domiciliation)
                && srl.is_done(StageId::Comptable)
        }
        StageId::RendezVous => srl.is_done(StageId::Notaire),
        StageId::FactureNotaire => srl.is_done(StageId::RendezVous),
        StageId::NumeroEntreprise => srl.is_done(StageId::FactureNotaire),
        StageId::Tva => srl.is_done(StageId::NumeroEntreprise),
        StageId::Affiliation => srl.is_done(StageId::Tva),
        StageId::FinalDelivery => srl.is_done(StageId::Affiliation),
    }
}
