//! Read-only dossier listings.

use serde::{Deserialize, Serialize};

use crate::draft::{Draft, Track, WorkflowStatus};
use crate::types::{DbId, Timestamp};

/// Listing projection of a dossier. Derived on read, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DossierSummary {
    /// Dossier id, or `None` for a local track slot.
    pub id: Option<DbId>,
    #[serde(rename = "type")]
    pub track: Track,
    pub status: WorkflowStatus,
    pub updated_at: Timestamp,
}

impl DossierSummary {
    /// Summarize an (upgraded) draft.
    pub fn from_draft(id: Option<DbId>, draft: &Draft) -> Self {
        Self {
            id,
            track: draft.track,
            status: draft.status(),
            updated_at: draft.meta.updated_at,
        }
    }

    /// Summarize a local track slot from its stored (not yet upgraded) draft.
    /// The draft's own workflow status wins; the separately stored status key
    /// is used only when the draft has none.
    pub fn from_track_slot(
        draft: &Draft,
        stored_status: Option<WorkflowStatus>,
    ) -> Self {
        let status = draft
            .workflow
            .status
            .or(stored_status)
            .unwrap_or_default();
        Self {
            id: None,
            track: draft.track,
            status,
            updated_at: draft.meta.updated_at,
        }
    }
}

/// Most recently updated first.
pub fn sort_by_recency(summaries: &mut [DossierSummary]) {
    summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// Keep only the summaries with `status`, when a filter is given.
pub fn filter_by_status(
    summaries: Vec<DossierSummary>,
    status: Option<WorkflowStatus>,
) -> Vec<DossierSummary> {
    match status {
        Some(wanted) => summaries.into_iter().filter(|s| s.status == wanted).collect(),
        None => summaries,
    }
}
