//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application. Handlers
//! publish a [`DossierEvent`] after each committed write; the change stream
//! and the notification router subscribe.

use chrono::{DateTime, Utc};
use dossier_core::draft::WorkflowStatus;
use dossier_core::message::Sender;
use dossier_core::stages::StageId;
use dossier_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// DossierEvent
// ---------------------------------------------------------------------------

/// Something that changed on a dossier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DossierEvent {
    /// The draft was written.
    Updated {
        dossier_id: DbId,
        owner_id: DbId,
        by: Sender,
        at: DateTime<Utc>,
    },
    /// The top-level workflow status changed.
    StatusChanged {
        dossier_id: DbId,
        owner_id: DbId,
        status: WorkflowStatus,
        at: DateTime<Utc>,
    },
    /// Stages became visible to the client.
    StagesUnlocked {
        dossier_id: DbId,
        owner_id: DbId,
        owner_email: String,
        stages: Vec<StageId>,
        at: DateTime<Utc>,
    },
    MessagePosted {
        dossier_id: DbId,
        owner_id: DbId,
        sender: Sender,
        at: DateTime<Utc>,
    },
}

impl DossierEvent {
    pub fn dossier_id(&self) -> DbId {
        match self {
            Self::Updated { dossier_id, .. }
            | Self::StatusChanged { dossier_id, .. }
            | Self::StagesUnlocked { dossier_id, .. }
            | Self::MessagePosted { dossier_id, .. } => *dossier_id,
        }
    }

    pub fn owner_id(&self) -> DbId {
        match self {
            Self::Updated { owner_id, .. }
            | Self::StatusChanged { owner_id, .. }
            | Self::StagesUnlocked { owner_id, .. }
            | Self::MessagePosted { owner_id, .. } => *owner_id,
        }
    }

    /// Short name used in logs and as the SSE event name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Updated { .. } => "updated",
            Self::StatusChanged { .. } => "status_changed",
            Self::StagesUnlocked { .. } => "stages_unlocked",
            Self::MessagePosted { .. } => "message_posted",
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use dossier_events::bus::EventBus;
///
/// let bus = EventBus::default();
/// let _rx = bus.subscribe();
/// assert_eq!(bus.subscriber_count(), 1);
/// ```
pub struct EventBus {
    sender: broadcast::Sender<DossierEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest messages are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers. Dropped when nobody
    /// listens.
    pub fn publish(&self, event: DossierEvent) {
        tracing::debug!(kind = event.kind(), dossier_id = event.dossier_id(), "Dossier event");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DossierEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn unlocked(dossier_id: DbId) -> DossierEvent {
        DossierEvent::StagesUnlocked {
            dossier_id,
            owner_id: 3,
            owner_email: "ana@example.be".into(),
            stages: vec![StageId::PlanFinancier],
            at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(unlocked(42));

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.dossier_id(), 42);
        assert_eq!(received.owner_id(), 3);
        assert_eq!(received.kind(), "stages_unlocked");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(unlocked(1));

        assert_eq!(rx1.recv().await.unwrap(), rx2.recv().await.unwrap());
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(unlocked(1));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn event_serializes_with_kind_tag() {
        let json = serde_json::to_value(DossierEvent::StatusChanged {
            dossier_id: 5,
            owner_id: 1,
            status: WorkflowStatus::InProgress,
            at: Utc::now(),
        })
        .unwrap();
        assert_eq!(json["kind"], "status_changed");
        assert_eq!(json["status"], "in_progress");

        let json = serde_json::to_value(unlocked(9)).unwrap();
        assert_eq!(json["stages"][0], "planFinancier");
    }
}
