//! Dossier workflow engine.
//!
//! Pure domain logic shared by the storage and HTTP layers: the draft model
//! and its defaults, the SRL stage machine, the client visibility gate, the
//! client/admin draft merge, status history, pricing, and the
//! [`service::DossierService`] that ties them to a [`store::DossierStore`].

pub mod autosave;
pub mod defaults;
pub mod draft;
pub mod error;
pub mod history;
pub mod lifecycle;
pub mod message;
pub mod notify;
pub mod payment;
pub mod promo;
pub mod roles;
pub mod sanitize;
pub mod service;
pub mod stages;
pub mod store;
pub mod summary;
pub mod types;
pub mod validation;
pub mod visibility;
