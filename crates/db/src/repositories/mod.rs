//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod dossier_repo;
pub mod message_repo;
pub mod promo_code_repo;
pub mod status_event_repo;
pub mod track_slot_repo;

pub use dossier_repo::DossierRepo;
pub use message_repo::MessageRepo;
pub use promo_code_repo::PromoCodeRepo;
pub use status_event_repo::StatusEventRepo;
pub use track_slot_repo::TrackSlotRepo;
