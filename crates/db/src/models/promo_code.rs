//! Promo code row model.

use dossier_core::promo::{PromoCode, PromoType};
use dossier_core::store::StoreError;
use dossier_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `promo_codes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PromoCodeRow {
    pub code: String,
    pub promo_type: String,
    pub value: f64,
    pub active: bool,
    pub note: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub fn promo_type_str(promo_type: PromoType) -> &'static str {
    match promo_type {
        PromoType::Percent => "percent",
        PromoType::Fixed => "fixed",
    }
}

impl TryFrom<PromoCodeRow> for PromoCode {
    type Error = StoreError;

    fn try_from(row: PromoCodeRow) -> Result<Self, Self::Error> {
        let promo_type = match row.promo_type.as_str() {
            "percent" => PromoType::Percent,
            "fixed" => PromoType::Fixed,
            other => {
                return Err(StoreError::Backend(format!(
                    "Unknown promo type '{other}' for code {}",
                    row.code
                )))
            }
        };
        Ok(PromoCode {
            code: row.code,
            promo_type,
            value: row.value,
            active: row.active,
            note: row.note,
        })
    }
}
