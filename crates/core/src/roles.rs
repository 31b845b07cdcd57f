//! Role names and the authenticated identity.
//!
//! The engine only knows two roles. Any authenticated identity that is not
//! flagged as admin acts as the dossier's client.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CLIENT: &str = "client";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Admin,
}

impl Role {
    /// Map a role claim to a [`Role`]. Unknown values fall back to `Client`.
    pub fn from_claim(role: &str) -> Self {
        if role == ROLE_ADMIN {
            Self::Admin
        } else {
            Self::Client
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => ROLE_CLIENT,
            Self::Admin => ROLE_ADMIN,
        }
    }
}

/// Identity supplied by the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: DbId,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_claim_maps_to_admin() {
        assert_eq!(Role::from_claim("admin"), Role::Admin);
    }

    #[test]
    fn any_other_claim_is_client() {
        assert_eq!(Role::from_claim("client"), Role::Client);
        assert_eq!(Role::from_claim("reviewer"), Role::Client);
        assert_eq!(Role::from_claim(""), Role::Client);
    }
}
