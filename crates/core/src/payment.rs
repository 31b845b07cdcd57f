//! Payment collaborator contract.
//!
//! The checkout itself runs elsewhere; it reports a completed payment by
//! posting a [`PaymentCompleted`] body signed with a shared secret.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::draft::Track;
use crate::types::DbId;

/// The customer that paid, as known to the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: DbId,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Opaque "payment completed" notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCompleted {
    /// Dossier the checkout was opened for, when the gateway echoes it back.
    #[serde(default)]
    pub dossier_id: Option<DbId>,
    pub track: Track,
    pub customer: Customer,
}

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of `body`.
pub fn compute_signature(secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Check a hex signature against `body` in constant time.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Some(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| s.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
            .collect()
    }
}
