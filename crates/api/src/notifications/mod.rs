//! Notification routing.
//!
//! The [`NotificationRouter`] subscribes to the event bus and tells dossier
//! owners about stages that became available to them.

pub mod router;

pub use router::NotificationRouter;
