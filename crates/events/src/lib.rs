//! Dossier change events and outbound notifications.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, feeding the live change stream and the
//!   notification router.
//! - [`DossierEvent`]: what changed on a dossier.
//! - [`delivery`]: the [`Notifier`] trait with SMTP and log implementations.

pub mod bus;
pub mod delivery;

pub use bus::{DossierEvent, EventBus};
pub use delivery::email::{EmailConfig, EmailNotifier};
pub use delivery::{DeliveryError, LogNotifier, Notifier};
