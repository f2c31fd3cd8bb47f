//! Pure inspection of bearer-credential claims.
//!
//! Credentials issued by the platform are JWTs; the client only ever needs
//! the `exp` claim to decide whether the held credential is still usable.
//! Nothing here verifies signatures — validity is the server's concern.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Errors produced while reading a credential's claims.
///
/// Callers treat any of these as "credential unusable" and request a fresh
/// one; the variants exist for logging, not for branching.
#[derive(Debug, Error)]
pub enum ClaimsError {
    /// The credential is not a three-segment JWT
    #[error("credential is not a three-segment token")]
    Malformed,

    /// The claims segment is not valid base64url
    #[error("claims segment is not valid base64url: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The claims segment is not valid JSON
    #[error("claims segment is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The claims carry no usable `exp` value
    #[error("claims carry no usable expiry")]
    MissingExpiry,
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Extract the expiry instant from an opaque bearer credential.
///
/// # Errors
///
/// Returns [`ClaimsError`] when the credential does not have three
/// dot-separated segments, the claims segment fails base64url or JSON
/// decoding, or the `exp` claim is absent or out of range.
pub fn expires_at(token: &str) -> Result<DateTime<Utc>, ClaimsError> {
    let mut segments = token.split('.');
    let claims_segment = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(claims), Some(_)) => claims,
        _ => return Err(ClaimsError::Malformed),
    };
    if segments.next().is_some() {
        return Err(ClaimsError::Malformed);
    }

    let raw = URL_SAFE_NO_PAD.decode(claims_segment)?;
    let claims: Claims = serde_json::from_slice(&raw)?;
    let exp = claims.exp.ok_or(ClaimsError::MissingExpiry)?;

    Utc.timestamp_opt(exp, 0).single().ok_or(ClaimsError::MissingExpiry)
}
