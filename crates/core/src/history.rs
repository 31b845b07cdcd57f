//! Append-only audit trail of top-level workflow status changes.

use serde::{Deserialize, Serialize};

use crate::draft::WorkflowStatus;
use crate::types::Timestamp;

/// One recorded workflow status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub status: WorkflowStatus,
    pub at: Timestamp,
}

/// Whether `status` should be appended after `history`.
///
/// Consecutive repeats are skipped so that re-applying the same status is
/// idempotent.
pub fn should_append(history: &[StatusEvent], status: WorkflowStatus) -> bool {
    history.last().map_or(true, |last| last.status != status)
}

/// Append `status` to `history` unless it repeats the last entry. Returns
/// whether it was appended.
pub fn record_status(
    history: &mut Vec<StatusEvent>,
    status: WorkflowStatus,
    at: Timestamp,
) -> bool {
    if !should_append(history, status) {
        return false;
    }
    history.push(StatusEvent { status, at });
    true
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn t0() -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2026, 5, 10, 8, 0, 0).unwrap()
    }

    #[test]
    fn empty_history_accepts_first_status() {
        let mut history = Vec::new();
        assert!(record_status(&mut history, WorkflowStatus::New, t0()));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn repeated_status_is_recorded_once() {
        let mut history = Vec::new();
        assert!(record_status(&mut history, WorkflowStatus::InProgress, t0()));
        assert!(!record_status(
            &mut history,
            WorkflowStatus::InProgress,
            t0() + Duration::minutes(1)
        ));
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].at, t0());
    }

    #[test]
    fn only_consecutive_repeats_are_skipped() {
        let mut history = Vec::new();
        record_status(&mut history, WorkflowStatus::New, t0());
        record_status(&mut history, WorkflowStatus::InProgress, t0());
        record_status(&mut history, WorkflowStatus::New, t0());

        let statuses: Vec<_> = history.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![WorkflowStatus::New, WorkflowStatus::InProgress, WorkflowStatus::New]
        );
    }
}
