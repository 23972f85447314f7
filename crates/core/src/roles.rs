//! Login roles.
//!
//! Stored as text in `users.role`; the values must match the `ck_users_role`
//! check constraint in `20261019000001_create_users_and_sessions.sql`.

use serde::{Deserialize, Serialize};

/// Salon operator; owns one or more salons.
pub const ROLE_OWNER: &str = "owner";
/// Portal user linked to one or more client records.
pub const ROLE_CLIENT: &str = "client";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Client,
}

impl Role {
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            ROLE_OWNER => Ok(Self::Owner),
            ROLE_CLIENT => Ok(Self::Client),
            _ => Err(format!(
                "Invalid role '{s}'. Must be one of: {ROLE_OWNER}, {ROLE_CLIENT}"
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => ROLE_OWNER,
            Self::Client => ROLE_CLIENT,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
