//! Client draft merge.
//!
//! A client write replaces the whole draft, but only the client-owned parts
//! of it are taken. [`merge_client_draft`] starts from the incoming draft and
//! forces every admin-owned value back to what is stored, one stage reducer
//! at a time. Stage statuses, admin notes and the top-level workflow status
//! can therefore never change through a client request.
//!
//! Dropped values are not errors: the client UI never offers those controls,
//! so a mismatch only means a stale or tampered payload.

use crate::draft::{Draft, MetaStatus, Track};
use crate::stages::{BanqueStage, ComptableStage, DomiciliationStage, SrlWorkflow, StageId};

/// Merge a client-submitted draft into the stored one.
///
/// Both drafts are expected to be upgraded. The result satisfies
/// `result.workflow.status == existing.workflow.status` and every admin-owned
/// stage field equals the stored value.
pub fn merge_client_draft(existing: &Draft, incoming: Draft) -> Draft {
    let mut next = incoming;

    // The track is fixed at creation.
    next.track = existing.track;

    next.meta.status = merge_meta_status(existing.meta.status, next.meta.status);
    next.workflow.status = existing.workflow.status;

    next.workflow.srl = match (existing.track, existing.workflow.srl.as_ref()) {
        (Track::Srl, Some(stored)) => Some(merge_srl(stored, next.workflow.srl.take())),
        _ => existing.workflow.srl.clone(),
    };

    if next != *existing {
        tracing::debug!(track = existing.track.as_str(), "Client draft merged");
    }
    next
}

/// `paid` can only come from the stored draft; the client may otherwise
/// move between `draft` and `submitted`.
fn merge_meta_status(existing: MetaStatus, incoming: MetaStatus) -> MetaStatus {
    match (existing, incoming) {
        (MetaStatus::Paid, _) => MetaStatus::Paid,
        (stored, MetaStatus::Paid) => stored,
        (_, requested) => requested,
    }
}

fn merge_srl(stored: &SrlWorkflow, incoming: Option<SrlWorkflow>) -> SrlWorkflow {
    let Some(incoming) = incoming else {
        return stored.clone();
    };

    let mut next = stored.clone();
    for id in StageId::ALL {
        match id {
            StageId::Banque => next.banque = merge_banque(&stored.banque, &incoming.banque),
            StageId::Domiciliation => {
                next.domiciliation =
                    merge_domiciliation(&stored.domiciliation, &incoming.domiciliation)
            }
            StageId::Comptable => {
                next.comptable = merge_comptable(&stored.comptable, &incoming.comptable)
            }
            // Not client-writable: the stored copy in `next` stands.
            StageId::Dossier
            | StageId::PlanFinancier
            | StageId::Notaire
            | StageId::RendezVous
            | StageId::FactureNotaire
            | StageId::NumeroEntreprise
            | StageId::Tva
            | StageId::Affiliation
            | StageId::FinalDelivery => {}
        }
    }
    next
}

/// Client fields: `attestationFileName`, `alternativeWithin3Months`.
fn merge_banque(stored: &BanqueStage, incoming: &BanqueStage) -> BanqueStage {
    BanqueStage {
        attestation_file_name: incoming.attestation_file_name.clone(),
        alternative_within3_months: incoming.alternative_within3_months,
        ..stored.clone()
    }
}

/// Client fields: `choice`, `providerName`, `leaseFileName`.
fn merge_domiciliation(
    stored: &DomiciliationStage,
    incoming: &DomiciliationStage,
) -> DomiciliationStage {
    DomiciliationStage {
        choice: incoming.choice,
        provider_name: incoming.provider_name.clone(),
        lease_file_name: incoming.lease_file_name.clone(),
        ..stored.clone()
    }
}

/// Client fields: `selectedProposalId`, `ownAccountantName`.
fn merge_comptable(stored: &ComptableStage, incoming: &ComptableStage) -> ComptableStage {
    ComptableStage {
        selected_proposal_id: incoming.selected_proposal_id.clone(),
        own_accountant_name: incoming.own_accountant_name.clone(),
        ..stored.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
