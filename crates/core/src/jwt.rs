//! JWT payload inspection
//!
//! Tokens are decoded without verifying their signature: the client only
//! needs the expiry to decide when to refresh, and the server remains the
//! authority on validity. Every check is fail-closed, so a token whose
//! payload cannot be read, or that carries no `exp`, counts as expired.

use base64::Engine;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::{DecodePaddingMode, general_purpose};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Default look-ahead used to decide that a token is about to expire
pub const DEFAULT_EXPIRY_THRESHOLD_MINUTES: i64 = 5;

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decoded JWT payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Expiration time (UTC epoch seconds)
    #[serde(default)]
    pub exp: Option<i64>,
    /// Issued at (UTC epoch seconds)
    #[serde(default)]
    pub iat: Option<i64>,
    /// Subject
    #[serde(default)]
    pub sub: Option<String>,
    /// Any other claims
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Decode the payload segment of `token`.
pub fn decode(token: &str) -> Option<Claims> {
    let Some(payload) = token.split('.').nth(1) else {
        debug!("Token has no payload segment");
        return None;
    };

    let bytes = match URL_SAFE_LENIENT
        .decode(payload)
        .or_else(|_| STANDARD_LENIENT.decode(payload))
    {
        Ok(bytes) => bytes,
        Err(error) => {
            debug!(%error, "Token payload is not valid base64");
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(claims) => Some(claims),
        Err(error) => {
            debug!(%error, "Token payload is not a JSON claims object");
            None
        }
    }
}

fn exp_of(token: &str) -> Option<i64> {
    decode(token)?.exp
}

/// Whether `token` has expired
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

/// Whether `token` had expired at `now`
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    exp_of(token).is_none_or(|exp| exp < now.timestamp())
}

/// Whether `token` expires within `threshold_minutes` from now
pub fn expires_within(token: &str, threshold_minutes: i64) -> bool {
    expires_within_at(token, threshold_minutes, Utc::now())
}

/// Whether `token` expires within `threshold_minutes` of `now`
pub fn expires_within_at(token: &str, threshold_minutes: i64, now: DateTime<Utc>) -> bool {
    let threshold = now.timestamp().saturating_add(threshold_minutes.saturating_mul(60));
    exp_of(token).is_none_or(|exp| exp < threshold)
}

/// Absolute expiry time of `token`
pub fn expiration_date(token: &str) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(exp_of(token)?, 0)
}

/// Build an unsigned token carrying `claims`; used to fabricate tokens in
/// tests across the workspace.
pub fn unsigned_token(claims: &Value) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn token_expiring_at(exp: i64) -> String {
        unsigned_token(&json!({ "sub": "user-1", "exp": exp }))
    }

    #[test]
    fn test_decode_reads_claims() {
        let token = unsigned_token(&json!({ "sub": "user-1", "exp": 1_700_000_000, "role": "customer" }));
        let claims = decode(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("user-1"));
        assert_eq!(claims.exp, Some(1_700_000_000));
        assert_eq!(claims.extra["role"], "customer");
    }

    #[test]
    fn test_decode_accepts_padded_standard_base64() {
        let payload = general_purpose::STANDARD.encode(r#"{"exp":1700000000,"n":"??>"}"#);
        let token = format!("h.{payload}.s");
        assert_eq!(decode(&token).unwrap().exp, Some(1_700_000_000));
    }

    #[test]
    fn test_decode_rejects_malformed_tokens() {
        assert!(decode("").is_none());
        assert!(decode("no-dots").is_none());
        assert!(decode("a.!!!.c").is_none());
        let not_json = general_purpose::URL_SAFE_NO_PAD.encode("hello");
        assert!(decode(&format!("a.{not_json}.c")).is_none());
    }

    #[test]
    fn test_missing_exp_is_fail_closed() {
        let token = unsigned_token(&json!({ "sub": "user-1" }));
        assert!(decode(&token).is_some());
        assert!(is_expired(&token));
        assert!(expires_within(&token, DEFAULT_EXPIRY_THRESHOLD_MINUTES));
        assert!(expiration_date(&token).is_none());

        assert!(is_expired("garbage"));
        assert!(expires_within("garbage", 5));
    }

    #[test]
    fn test_is_expired_compares_against_now() {
        let now = Utc::now();
        let past = token_expiring_at((now - Duration::seconds(1)).timestamp());
        let future = token_expiring_at((now + Duration::hours(1)).timestamp());

        assert!(is_expired_at(&past, now));
        assert!(!is_expired_at(&future, now));
    }

    #[test]
    fn test_expires_within_threshold() {
        let now = Utc::now();
        let far = token_expiring_at((now + Duration::minutes(30)).timestamp());
        let soon = token_expiring_at((now + Duration::minutes(4)).timestamp());

        assert!(!expires_within_at(&far, 5, now));
        assert!(expires_within_at(&soon, 5, now));
        assert!(!expires_within_at(&soon, 3, now));
    }

    #[test]
    fn test_expiration_date() {
        let token = token_expiring_at(1_700_000_000);
        let date = expiration_date(&token).unwrap();
        assert_eq!(date.timestamp(), 1_700_000_000);
    }
}
