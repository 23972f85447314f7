//! Tokenized form delivery: assignment tokens, statuses and public links.
//!
//! A client-form assignment is addressed by an opaque alphanumeric token. The
//! token is the only credential for the public `/f/{token}` endpoint; it does
//! not expire and becomes useless once the assignment is completed.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of a generated assignment token.
pub const TOKEN_LENGTH: usize = 32;

pub const CLIENT_FORM_PENDING: &str = "pending";
pub const CLIENT_FORM_COMPLETED: &str = "completed";

/// Default `filled_by` recorded when the submitter does not identify themselves.
pub const DEFAULT_FILLED_BY: &str = "client";

/// Maximum length of a `filled_by` value.
pub const MAX_FILLED_BY_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientFormStatus {
    Pending,
    Completed,
}

impl ClientFormStatus {
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            CLIENT_FORM_PENDING => Ok(Self::Pending),
            CLIENT_FORM_COMPLETED => Ok(Self::Completed),
            _ => Err(format!("Invalid client form status '{s}'")),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => CLIENT_FORM_PENDING,
            Self::Completed => CLIENT_FORM_COMPLETED,
        }
    }
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Generate a new random assignment token.
pub fn generate_form_token() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Whether `key` has the shape of an assignment token.
///
/// Lets the public endpoint skip a token lookup for keys that cannot match.
pub fn looks_like_token(key: &str) -> bool {
    key.len() == TOKEN_LENGTH && key.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Parse a public form key as a numeric form id.
pub fn parse_form_id(key: &str) -> Option<DbId> {
    key.parse::<DbId>().ok().filter(|id| *id > 0)
}

/// Public link for a form key (token or form id).
pub fn public_form_url(base_url: &str, key: &str) -> String {
    format!("{}/f/{key}", base_url.trim_end_matches('/'))
}

/// Normalize a submitter-supplied `filled_by` value.
pub fn normalize_filled_by(filled_by: Option<&str>) -> Result<String, String> {
    let value = filled_by.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Ok(DEFAULT_FILLED_BY.to_string());
    }
    if value.len() > MAX_FILLED_BY_LENGTH {
        return Err(format!(
            "filled_by exceeds maximum length of {MAX_FILLED_BY_LENGTH}"
        ));
    }
    Ok(value.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_have_fixed_shape() {
        let token = generate_form_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(looks_like_token(&token));
    }

    #[test]
    fn generated_tokens_differ() {
        assert_ne!(generate_form_token(), generate_form_token());
    }

    #[test]
    fn token_shape_check() {
        assert!(!looks_like_token("42"));
        assert!(!looks_like_token(&"a".repeat(TOKEN_LENGTH - 1)));
        assert!(!looks_like_token(&format!("{}-", "a".repeat(TOKEN_LENGTH - 1))));
    }

    #[test]
    fn form_id_parsing() {
        assert_eq!(parse_form_id("17"), Some(17));
        assert_eq!(parse_form_id("0"), None);
        assert_eq!(parse_form_id("-3"), None);
        assert_eq!(parse_form_id("abc"), None);
    }

    #[test]
    fn public_url_trims_trailing_slash() {
        assert_eq!(
            public_form_url("https://book.example.com/", "abc"),
            "https://book.example.com/f/abc"
        );
    }

    #[test]
    fn client_form_status_round_trip() {
        assert_eq!(
            ClientFormStatus::from_str_value("completed").unwrap(),
            ClientFormStatus::Completed
        );
        assert_eq!(ClientFormStatus::Pending.as_str(), "pending");
        assert!(ClientFormStatus::from_str_value("expired").is_err());
    }

    #[test]
    fn filled_by_defaults_and_limits() {
        assert_eq!(normalize_filled_by(None).unwrap(), "client");
        assert_eq!(normalize_filled_by(Some("  ")).unwrap(), "client");
        assert_eq!(normalize_filled_by(Some(" Ana ")).unwrap(), "Ana");
        assert!(normalize_filled_by(Some(&"x".repeat(MAX_FILLED_BY_LENGTH + 1))).is_err());
    }
}
