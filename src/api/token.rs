//! Session token service.
//!
//! Tokens are stateless HS256 JWTs carrying only the user id and the
//! issue/expiry times, signed with the process-wide secret. There is no
//! server-side session table: validity is entirely signature plus expiry,
//! and a token cannot be revoked before it expires.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the user id
    pub sub: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Issue a signed session token for a user, valid for `ttl_secs`.
pub fn issue(secret: &str, user_id: i64, ttl_secs: i64) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: user_id,
        iat: now,
        exp: now + ttl_secs,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).context("Failed to encode session token")
}

/// Verify a session token and return the user id it was issued for.
///
/// Every failure mode (bad signature, malformed structure, expiry) collapses
/// to `None` so callers cannot tell why verification failed.
pub fn verify(secret: &str, token: &str) -> Option<i64> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    // No grace period: a token is invalid the moment its expiry passes
    validation.leeway = 0;

    decode::<SessionClaims>(token, &key, &validation)
        .ok()
        .map(|data| data.claims.sub)
}
