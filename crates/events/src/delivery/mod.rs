//! Outbound notification channels.
//!
//! The notification router hands rendered content to a [`Notifier`]. Delivery
//! is best effort: callers log failures and move on.

pub mod email;

use async_trait::async_trait;
use dossier_core::notify::NotificationContent;

use self::email::EmailError;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Email(#[from] EmailError),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name for logs.
    fn name(&self) -> &'static str;

    async fn send(&self, to: &str, content: &NotificationContent) -> Result<(), DeliveryError>;
}

/// Writes notifications to the log instead of sending them. Used when no
/// SMTP server is configured.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, to: &str, content: &NotificationContent) -> Result<(), DeliveryError> {
        tracing::info!(to, subject = %content.subject, "Notification (not sent, SMTP not configured)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use dossier_core::notify::unlock_notification;
    use dossier_core::stages::StageId;

    use super::*;

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        let notifier = LogNotifier;
        let content = unlock_notification(StageId::Notaire);
        assert!(notifier.send("ana@example.be", &content).await.is_ok());
        assert_eq!(notifier.name(), "log");
    }
}
