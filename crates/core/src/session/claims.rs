//! Token payload decoding
//!
//! Tokens are never verified here. The signature and expiry belong to the
//! remote API; the client only reads the claims body to drive display state.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, Engine, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Errors raised while reading a token payload
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The token is not made of three dot-separated segments
    #[error("Token has {segments} segment(s), expected 3")]
    Malformed { segments: usize },

    /// The payload segment is empty
    #[error("Token payload segment is empty")]
    MissingPayload,

    /// The payload segment is not base64
    #[error("Token payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded payload is not a claims object
    #[error("Token payload is not a valid claims object: {0}")]
    Claims(#[from] serde_json::Error),
}

/// Claims carried in the middle segment of a session token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Administrator flag issued by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_superuser: Option<bool>,

    /// Every other claim, kept as raw JSON
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Whether the token grants administrator status. An absent claim counts as `false`.
    pub fn is_admin(&self) -> bool {
        self.is_superuser.unwrap_or(false)
    }

    /// Username claim, when the API includes one
    pub fn username(&self) -> Option<&str> {
        self.extra.get("username").and_then(Value::as_str)
    }
}

/// Decode the claims of a `header.payload.signature` token without verifying it
///
/// # Errors
///
/// Returns a [`DecodeError`] when the token does not have three segments, the
/// payload is empty or not base64, or the decoded bytes are not a JSON object.
pub fn decode_claims(token: &str) -> Result<Claims, DecodeError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return Err(DecodeError::Malformed {
            segments: segments.len(),
        });
    };

    if payload.is_empty() {
        return Err(DecodeError::MissingPayload);
    }

    let bytes = URL_SAFE_LENIENT
        .decode(payload)
        .or_else(|_| STANDARD_LENIENT.decode(payload))?;

    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_payload(payload: &str) -> String {
        format!("header.{}.sig", URL_SAFE_LENIENT.encode(payload))
    }

    #[test]
    fn test_decode_superuser_claim() {
        let claims = decode_claims("header.eyJpc19zdXBlcnVzZXIiOnRydWV9.sig").unwrap();
        assert_eq!(claims.is_superuser, Some(true));
        assert!(claims.is_admin());
    }

    #[test]
    fn test_absent_claim_is_not_admin() {
        let token = token_with_payload(r#"{"user_id":7,"token_type":"access"}"#);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.is_superuser, None);
        assert!(!claims.is_admin());
        assert_eq!(claims.extra.get("user_id"), Some(&Value::from(7)));
    }

    #[test]
    fn test_username_claim() {
        let token = token_with_payload(r#"{"username":"ana","is_superuser":false}"#);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.username(), Some("ana"));
        assert!(!claims.is_admin());
    }

    #[test]
    fn test_url_safe_payload_without_padding() {
        // {"is_superuser":true,"q":"???"}
        let claims = decode_claims("h.eyJpc19zdXBlcnVzZXIiOnRydWUsInEiOiI_Pz8ifQ.s").unwrap();
        assert!(claims.is_admin());
        assert_eq!(claims.extra.get("q"), Some(&Value::from("???")));
    }

    #[test]
    fn test_rejects_wrong_segment_count() {
        assert!(matches!(
            decode_claims("not-a-jwt"),
            Err(DecodeError::Malformed { segments: 1 })
        ));
        assert!(matches!(
            decode_claims("a.b.c.d"),
            Err(DecodeError::Malformed { segments: 4 })
        ));
    }

    #[test]
    fn test_rejects_empty_payload() {
        assert!(matches!(
            decode_claims("header..sig"),
            Err(DecodeError::MissingPayload)
        ));
    }

    #[test]
    fn test_rejects_invalid_base64() {
        assert!(matches!(
            decode_claims("header.%%%.sig"),
            Err(DecodeError::Base64(_))
        ));
    }

    #[test]
    fn test_rejects_non_object_payload() {
        let token = token_with_payload("true");
        assert!(matches!(decode_claims(&token), Err(DecodeError::Claims(_))));

        let token = token_with_payload(r#"{"is_superuser":"yes"}"#);
        assert!(matches!(decode_claims(&token), Err(DecodeError::Claims(_))));
    }
}
