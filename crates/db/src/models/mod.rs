//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` struct matching the table and, where
//! rows are inserted, a create DTO. Conversions into the core types live next
//! to the row they read.

pub mod dossier;
pub mod message;
pub mod promo_code;
pub mod status_event;
pub mod track_slot;
