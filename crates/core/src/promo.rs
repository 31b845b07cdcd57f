//! Promo codes and price computation.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::draft::Track;
use crate::error::CoreError;

/// How a promo reduces the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoType {
    Percent,
    Fixed,
}

/// A promo code. `code` is stored normalized (trimmed, uppercase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoCode {
    pub code: String,
    #[serde(rename = "type")]
    pub promo_type: PromoType,
    pub value: f64,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub note: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Price breakdown in EUR, every amount rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    #[serde(rename = "baseEUR")]
    pub base_eur: f64,
    #[serde(rename = "discountEUR")]
    pub discount_eur: f64,
    #[serde(rename = "totalEUR")]
    pub total_eur: f64,
}

pub const DEFAULT_PRICE_SRL_EUR: f64 = 1250.0;
pub const DEFAULT_PRICE_PP_EUR: f64 = 450.0;

/// Base price of each registration track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPricing {
    #[serde(rename = "srlEUR")]
    pub srl_eur: f64,
    #[serde(rename = "ppEUR")]
    pub pp_eur: f64,
}

impl Default for TrackPricing {
    fn default() -> Self {
        Self {
            srl_eur: DEFAULT_PRICE_SRL_EUR,
            pp_eur: DEFAULT_PRICE_PP_EUR,
        }
    }
}

impl TrackPricing {
    pub fn base_for(&self, track: Track) -> f64 {
        match track {
            Track::Srl => self.srl_eur,
            Track::Pp => self.pp_eur,
        }
    }
}

/// Normalize a user-entered code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9_-]{2,32}$").expect("valid regex"));

/// Normalize and validate a promo before it is stored.
pub fn validate_promo(mut promo: PromoCode) -> Result<PromoCode, CoreError> {
    promo.code = normalize_code(&promo.code);

    if !CODE_PATTERN.is_match(&promo.code) {
        return Err(CoreError::Validation(format!(
            "Invalid promo code '{}'. Use 2-32 letters, digits, '-' or '_'",
            promo.code
        )));
    }
    if !promo.value.is_finite() || promo.value <= 0.0 {
        return Err(CoreError::Validation(
            "Promo value must be greater than zero".to_string(),
        ));
    }
    if promo.promo_type == PromoType::Percent && promo.value > 100.0 {
        return Err(CoreError::Validation(
            "Percent promo value cannot exceed 100".to_string(),
        ));
    }
    promo.note = promo.note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    Ok(promo)
}

fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Apply a promo to a base amount.
///
/// The discount never exceeds the base amount and is never negative.
pub fn apply_promo_to_amount_eur(base_amount: f64, promo: Option<&PromoCode>) -> PriceBreakdown {
    let base = round2(base_amount.max(0.0));
    let raw_discount = match promo {
        Some(p) => match p.promo_type {
            PromoType::Percent => base * p.value / 100.0,
            PromoType::Fixed => p.value,
        },
        None => 0.0,
    };
    let discount = round2(raw_discount.clamp(0.0, base));
    PriceBreakdown {
        base_eur: base,
        discount_eur: discount,
        total_eur: round2(base - discount),
    }
}
