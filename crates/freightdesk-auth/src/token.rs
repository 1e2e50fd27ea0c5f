//! Local inspection of stored access tokens.
//!
//! Restoring a session does not need to hit the backend with a token that has
//! already run out. The `exp` claim is read without verifying the signature;
//! the backend stays the only authority on whether a token is valid.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Read the expiry of a JWT without validating it.
///
/// Returns `None` for opaque (non-JWT) tokens and tokens without `exp`.
pub fn peek_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    Utc.timestamp_opt(data.claims.exp?, 0).single()
}

/// Check if a token is known to be expired at `now`.
///
/// A token whose expiry cannot be read is not considered expired.
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    peek_expiry(token).is_some_and(|exp| exp <= now)
}
