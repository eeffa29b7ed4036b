//! Unverified JWT claims decoding.
//!
//! The access token is treated as an opaque credential issued and verified
//! by the remote service; only the unsigned claims segment is read, for
//! display and for backfilling the user id. No signature verification.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use super::error::{AuthError, Result};

/// Claims read from the middle segment of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtClaims {
    /// The `sub` claim: a colon-delimited hierarchical identifier whose
    /// final segment is the user id.
    pub subject: String,
    /// The `email` claim, if present.
    pub email: Option<String>,
    /// The `exp` claim as a unix timestamp, if present.
    pub expiry: Option<i64>,
}

impl JwtClaims {
    /// The user id carried in the subject, requiring the hierarchical
    /// `seg:seg:seg:id` shape.
    pub fn user_id(&self) -> Option<&str> {
        let segments: Vec<&str> = self.subject.split(':').collect();
        if segments.len() != 4 || segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(segments[3])
    }
}

/// Decode the claims segment of a three-part token.
pub fn decode(token: &str) -> Result<JwtClaims> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::InvalidTokenFormat);
    }

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|_| AuthError::InvalidTokenFormat)?;
    let raw: serde_json::Value =
        serde_json::from_slice(&payload).map_err(|_| AuthError::InvalidTokenFormat)?;
    let claims = raw.as_object().ok_or(AuthError::InvalidTokenFormat)?;

    Ok(JwtClaims {
        subject: claims
            .get("sub")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        email: claims
            .get("email")
            .and_then(|v| v.as_str())
            .map(str::to_owned),
        // exp may arrive as integer or float; coerce either way
        expiry: claims.get("exp").and_then(|v| v.as_f64()).map(|f| f as i64),
    })
}

/// True iff the claims carry a nonzero expiry strictly before `now`.
pub fn is_expired(claims: &JwtClaims, now: i64) -> bool {
    matches!(claims.expiry, Some(exp) if exp != 0 && exp < now)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn make_token(claims: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.as_bytes());
        format!("{header}.{payload}.")
    }

    #[test]
    fn test_decode_claims() {
        let token = make_token(
            r#"{"sub":"BRN:TEST:USER:uuid-123","email":"test@example.com","exp":1700000000}"#,
        );
        let claims = decode(&token).expect("token should decode");
        assert_eq!(claims.subject, "BRN:TEST:USER:uuid-123");
        assert_eq!(claims.email.as_deref(), Some("test@example.com"));
        assert_eq!(claims.expiry, Some(1700000000));
    }

    #[test]
    fn test_decode_float_expiry() {
        let token = make_token(r#"{"sub":"A:B:C:id","exp":1700000000.0}"#);
        let claims = decode(&token).expect("token should decode");
        assert_eq!(claims.expiry, Some(1700000000));
    }

    #[rstest]
    #[case("not-a-jwt")]
    #[case("one.two")]
    #[case("one.two.three.four")]
    #[case("")]
    fn test_decode_rejects_wrong_segment_count(#[case] token: &str) {
        assert!(matches!(decode(token), Err(AuthError::InvalidTokenFormat)));
    }

    #[test]
    fn test_decode_rejects_garbage_payload() {
        assert!(decode("aGVhZGVy.!!!not-base64!!!.c2ln").is_err());
        let token = format!("h.{}.s", URL_SAFE_NO_PAD.encode(b"not json"));
        assert!(decode(&token).is_err());
    }

    #[test]
    fn test_user_id_from_subject() {
        let claims = decode(&make_token(r#"{"sub":"A:B:C:id-123"}"#)).unwrap();
        assert_eq!(claims.user_id(), Some("id-123"));
    }

    #[rstest]
    #[case(r#"{"sub":"just-an-id"}"#)]
    #[case(r#"{"sub":"A:B:C"}"#)]
    #[case(r#"{"sub":"A:B:C:D:E"}"#)]
    #[case(r#"{"sub":"A:B::id"}"#)]
    #[case(r#"{"exp":1}"#)]
    fn test_user_id_requires_hierarchical_subject(#[case] claims_json: &str) {
        let claims = decode(&make_token(claims_json)).unwrap();
        assert_eq!(claims.user_id(), None);
    }

    #[test]
    fn test_is_expired() {
        let now = 1700000000;
        let expired = JwtClaims {
            subject: String::new(),
            email: None,
            expiry: Some(now - 7200),
        };
        let fresh = JwtClaims {
            subject: String::new(),
            email: None,
            expiry: Some(now + 7200),
        };
        let unset = JwtClaims {
            subject: String::new(),
            email: None,
            expiry: None,
        };
        let zero = JwtClaims {
            subject: String::new(),
            email: None,
            expiry: Some(0),
        };
        assert!(is_expired(&expired, now));
        assert!(!is_expired(&fresh, now));
        assert!(!is_expired(&unset, now));
        assert!(!is_expired(&zero, now));
    }
}
