//! Access and refresh tokens.
//!
//! Access tokens are HS256 JWTs carrying the user id and [`Role`]. Refresh
//! tokens are opaque; `sessions` only ever sees their SHA-256 digest.

use atelier_core::hashing::sha256_hex;
use atelier_core::roles::Role;
use atelier_core::types::DbId;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::env_or;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// | Env Var                    | Default  |
    /// |----------------------------|----------|
    /// | `JWT_SECRET`               | required |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | `15`     |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | `7`      |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.is_empty(), "JWT_SECRET must be set and non-empty");

        Self {
            secret,
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", 15),
            refresh_token_expiry_days: env_or("JWT_REFRESH_EXPIRY_DAYS", 7),
        }
    }

    /// Access token lifetime in seconds, as reported to clients.
    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    pub fn issue_access_token(
        &self,
        user_id: DbId,
        role: Role,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            role,
            exp: iat + self.access_token_ttl_secs(),
            iat,
            jti: Uuid::new_v4().to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Decode an access token, checking signature and expiry.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
    }
}

/// A freshly minted refresh token.
#[derive(Debug)]
pub struct RefreshToken {
    /// Returned to the caller once.
    pub plaintext: String,
    /// Stored in `sessions.refresh_token_hash`.
    pub hash: String,
}

impl RefreshToken {
    pub fn generate() -> Self {
        let plaintext = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let hash = hash_refresh_token(&plaintext);
        Self { plaintext, hash }
    }
}

pub fn hash_refresh_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        }
    }

    #[test]
    fn access_token_carries_user_and_role() {
        let cfg = config("salon-signing-secret");
        let token = cfg.issue_access_token(42, Role::Client).unwrap();

        let claims = cfg.decode_access_token(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::Client);
        assert_eq!(claims.exp - claims.iat, cfg.access_token_ttl_secs());
    }

    #[test]
    fn expired_token_is_rejected() {
        let cfg = config("salon-signing-secret");
        // Past the library's default 60 second leeway.
        let iat = Utc::now().timestamp() - 3600;
        let claims = Claims {
            sub: 7,
            role: Role::Owner,
            exp: iat + 60,
            iat,
            jti: "old".into(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(cfg.secret.as_bytes()),
        )
        .unwrap();

        assert!(cfg.decode_access_token(&token).is_err());
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let token = config("first").issue_access_token(1, Role::Owner).unwrap();
        assert!(config("second").decode_access_token(&token).is_err());
    }

    #[test]
    fn refresh_tokens_are_unique_and_hashed() {
        let a = RefreshToken::generate();
        let b = RefreshToken::generate();
        assert_ne!(a.plaintext, b.plaintext);
        assert_eq!(a.hash, hash_refresh_token(&a.plaintext));
        assert_ne!(a.hash, a.plaintext);
    }
}
