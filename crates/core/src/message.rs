//! Append-only message thread between a client and the back office.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Maximum message length, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    Client,
    Admin,
}

impl Sender {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "client" => Ok(Self::Client),
            "admin" => Ok(Self::Admin),
            _ => Err(CoreError::Validation(format!(
                "Invalid sender '{s}'. Must be one of: client, admin"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: DbId,
    pub dossier_id: DbId,
    pub sender: Sender,
    pub text: String,
    pub created_at: Timestamp,
}

/// A message ready to be stored. Build it with [`NewMessage::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub dossier_id: DbId,
    pub sender: Sender,
    pub text: String,
    pub created_at: Timestamp,
}

impl NewMessage {
    /// Trim and validate the text.
    pub fn new(
        dossier_id: DbId,
        sender: Sender,
        text: &str,
        created_at: Timestamp,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            dossier_id,
            sender,
            text: validate_message_text(text)?,
            created_at,
        })
    }
}

/// Returns the trimmed text, or a validation error.
pub fn validate_message_text(text: &str) -> Result<String, CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Message text is required".to_string()));
    }
    if trimmed.chars().count() > MAX_MESSAGE_CHARS {
        return Err(CoreError::Validation(format!(
            "Message text must be at most {MAX_MESSAGE_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn text_is_trimmed() {
        assert_eq!(validate_message_text("  bonjour \n").unwrap(), "bonjour");
    }

    #[test]
    fn blank_text_is_rejected() {
        assert_matches!(validate_message_text("   "), Err(CoreError::Validation(_)));
    }

    #[test]
    fn length_is_counted_in_characters() {
        let at_limit = "é".repeat(MAX_MESSAGE_CHARS);
        assert!(validate_message_text(&at_limit).is_ok());
        let over = "a".repeat(MAX_MESSAGE_CHARS + 1);
        assert_matches!(validate_message_text(&over), Err(CoreError::Validation(_)));
    }

    #[test]
    fn sender_round_trips_through_db_string() {
        assert_eq!(Sender::from_str_db("admin").unwrap(), Sender::Admin);
        assert_eq!(Sender::Client.as_str(), "client");
        assert!(Sender::from_str_db("robot").is_err());
    }
}
