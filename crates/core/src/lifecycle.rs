//! Top-level workflow status machine and the payment-completion transition.
//!
//! ```text
//! new ──► in_progress ──► approved
//!  │            │
//!  └────────────┴───────► cancelled
//! ```
//!
//! `approved` and `cancelled` are terminal. Setting the current status again
//! is accepted and changes nothing.

use crate::defaults::upgrade_draft;
use crate::draft::{Draft, MetaStatus, WorkflowStatus};
use crate::error::CoreError;
use crate::types::Timestamp;

/// Validate an admin-requested workflow status change.
pub fn validate_workflow_transition(
    current: WorkflowStatus,
    next: WorkflowStatus,
) -> Result<(), CoreError> {
    use WorkflowStatus::*;

    if current == next {
        return Ok(());
    }
    if current.is_terminal() {
        return Err(CoreError::Conflict(format!(
            "Dossier is {} and can no longer change status",
            current.as_str()
        )));
    }
    match (current, next) {
        (New, InProgress) | (New, Cancelled) | (InProgress, Approved) | (InProgress, Cancelled) => {
            Ok(())
        }
        _ => Err(CoreError::Validation(format!(
            "Cannot move a dossier from {} to {}",
            current.as_str(),
            next.as_str()
        ))),
    }
}

/// Result of applying a payment to a draft.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentApplied {
    pub draft: Draft,
    /// `false` when the draft was already paid and in progress.
    pub changed: bool,
}

/// Apply the payment-completed transition.
///
/// Marks the form paid, moves `new` to `in_progress` and seeds the SRL stage
/// record from defaults where it is missing. Existing stage statuses are
/// kept, so a repeated delivery of the same payment is harmless.
pub fn complete_payment(draft: Draft, now: Timestamp) -> Result<PaymentApplied, CoreError> {
    let before = draft.clone();
    let mut next = upgrade_draft(draft);

    match next.status() {
        WorkflowStatus::New => next.set_status(WorkflowStatus::InProgress),
        WorkflowStatus::InProgress => {}
        terminal => {
            return Err(CoreError::Conflict(format!(
                "Payment received for a dossier that is already {}",
                terminal.as_str()
            )));
        }
    }
    next.meta.status = MetaStatus::Paid;

    let changed = next != before;
    if changed {
        next.touch(now);
    }
    Ok(PaymentApplied {
        draft: next,
        changed,
    })
}
