//! Event-to-notification routing.
//!
//! [`NotificationRouter`] consumes [`DossierEvent`]s and, for each
//! `StagesUnlocked` event, sends one notification covering all the stages it
//! names to the dossier owner. Delivery failures are logged and dropped.

use std::sync::Arc;

use dossier_core::notify::unlock_digest;
use dossier_events::{DossierEvent, Notifier};
use tokio::sync::broadcast;

pub struct NotificationRouter {
    notifier: Arc<dyn Notifier>,
}

impl NotificationRouter {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Run the routing loop until the event bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<DossierEvent>) {
        tracing::info!(channel = self.notifier.name(), "Notification router started");
        loop {
            match receiver.recv().await {
                Ok(event) => self.route_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver the notification for one event, if it calls for one.
    pub async fn route_event(&self, event: &DossierEvent) {
        let DossierEvent::StagesUnlocked {
            dossier_id,
            owner_email,
            stages,
            ..
        } = event
        else {
            return;
        };

        let Some(content) = unlock_digest(stages) else {
            return;
        };

        if let Err(e) = self.notifier.send(owner_email, &content).await {
            tracing::error!(
                error = %e,
                dossier_id,
                channel = self.notifier.name(),
                "Failed to deliver unlock notification"
            );
        }
    }
}
