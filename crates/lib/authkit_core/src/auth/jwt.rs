//! JWT token signing and verification.
//!
//! Tokens are HS256 JWS strings (`header.payload.signature`, base64url).
//! The signature covers the header and the whole claims payload.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use thiserror::Error;

use super::AuthError;
use crate::models::claims::Claims;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Token validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Invalid token signature")]
    SignatureInvalid,

    #[error("Token expired")]
    Expired,
}

impl From<jsonwebtoken::errors::Error> for ValidationError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => ValidationError::SignatureInvalid,
            ErrorKind::ExpiredSignature => ValidationError::Expired,
            _ => ValidationError::Malformed(e.to_string()),
        }
    }
}

/// Sign `claims` with `secret`.
pub fn issue(claims: &Claims, secret: &[u8]) -> Result<String, AuthError> {
    sign(&Header::new(ALGORITHM), claims, secret)
}

/// Sign `claims` with `secret`, recording `key_id` in the header's `kid`.
pub fn issue_with_key_id(
    claims: &Claims,
    secret: &[u8],
    key_id: &str,
) -> Result<String, AuthError> {
    let mut header = Header::new(ALGORITHM);
    header.kid = Some(key_id.to_string());
    sign(&header, claims, secret)
}

fn sign(header: &Header, claims: &Claims, secret: &[u8]) -> Result<String, AuthError> {
    encode(header, claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
}

/// Verify a token against `secret` and return its claims.
pub fn validate(token: &str, secret: &[u8]) -> Result<Claims, ValidationError> {
    validate_with(token, |_| Some(secret.to_vec()))
}

/// Verify a token, asking `resolve_key` for the secret.
///
/// `resolve_key` receives the header's `kid` (if any) and is called once.
/// Returning `None` rejects the token as `SignatureInvalid`.
pub fn validate_with<F>(token: &str, resolve_key: F) -> Result<Claims, ValidationError>
where
    F: FnOnce(Option<&str>) -> Option<Vec<u8>>,
{
    let header = decode_header(token)?;
    let secret = resolve_key(header.kid.as_deref()).ok_or(ValidationError::SignatureInvalid)?;

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&secret), &validation())?;
    Ok(data.claims)
}

/// HS256 only, `exp` optional but enforced with no leeway when present.
fn validation() -> Validation {
    let mut validation = Validation::new(ALGORITHM);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::auth::permissions::Permission;
    use crate::models::identity::{Identity, IdentityDraft};

    const KEY: &[u8] = b"fake-signing-key";

    fn claims(ttl: Duration) -> Claims {
        let identity = Identity::from_draft(
            IdentityDraft::new("a@b.com", Permission::ADMIN),
            Uuid::new_v4(),
            "hash".into(),
            Utc::now(),
        );
        Claims::new(&identity, Permission::USER, None, ttl, Utc::now())
    }

    #[test]
    fn issue_then_validate_returns_claims() {
        let c = claims(Duration::from_secs(60));
        let token = issue(&c, KEY).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(validate(&token, KEY).unwrap(), c);
    }

    #[test]
    fn token_without_exp_never_expires() {
        let c = claims(Duration::ZERO);
        let token = issue(&c, KEY).unwrap();
        let back = validate(&token, KEY).unwrap();
        assert_eq!(back.expires_at, None);
    }

    #[test]
    fn data_passes_through() {
        let mut c = claims(Duration::from_secs(60));
        let mut data = BTreeMap::new();
        data.insert("org".to_string(), "acme".to_string());
        c.data = Some(data.clone());
        let token = issue(&c, KEY).unwrap();
        assert_eq!(validate(&token, KEY).unwrap().data, Some(data));
    }

    #[test]
    fn wrong_key_is_signature_invalid() {
        let token = issue(&claims(Duration::from_secs(60)), KEY).unwrap();
        assert_eq!(
            validate(&token, b"other-key"),
            Err(ValidationError::SignatureInvalid)
        );
    }

    #[test]
    fn past_exp_is_expired() {
        let mut c = claims(Duration::from_secs(60));
        c.expires_at = Some(Utc::now().timestamp() - 5);
        let token = issue(&c, KEY).unwrap();
        assert_eq!(validate(&token, KEY), Err(ValidationError::Expired));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            validate("not-a-token", KEY),
            Err(ValidationError::Malformed(_))
        ));
        assert!(matches!(validate("", KEY), Err(ValidationError::Malformed(_))));
    }

    #[test]
    fn signed_payload_of_wrong_shape_is_malformed() {
        let payload = serde_json::json!({ "sub": "someone", "roles": ["admin"] });
        let token =
            encode(&Header::new(ALGORITHM), &payload, &EncodingKey::from_secret(KEY)).unwrap();
        assert!(matches!(
            validate(&token, KEY),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn other_algorithms_are_rejected() {
        let c = claims(Duration::from_secs(60));
        let token =
            encode(&Header::new(Algorithm::HS512), &c, &EncodingKey::from_secret(KEY)).unwrap();
        assert!(matches!(
            validate(&token, KEY),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn flipping_any_byte_never_yields_claims() {
        let token = issue(&claims(Duration::from_secs(60)), KEY).unwrap();
        let bytes = token.as_bytes();
        for i in 0..bytes.len() {
            let mut tampered = bytes.to_vec();
            tampered[i] ^= 0x01;
            let tampered = String::from_utf8(tampered).unwrap();
            match validate(&tampered, KEY) {
                Err(ValidationError::SignatureInvalid) | Err(ValidationError::Malformed(_)) => {}
                other => panic!("byte {i}: expected rejection, got {other:?}"),
            }
        }
    }

    #[test]
    fn key_resolver_sees_kid_and_can_refuse() {
        let c = claims(Duration::from_secs(60));
        let token = issue_with_key_id(&c, KEY, "primary").unwrap();

        let mut seen = None;
        let back = validate_with(&token, |kid| {
            seen = kid.map(str::to_string);
            Some(KEY.to_vec())
        })
        .unwrap();
        assert_eq!(back, c);
        assert_eq!(seen.as_deref(), Some("primary"));

        assert_eq!(
            validate_with(&token, |_| None),
            Err(ValidationError::SignatureInvalid)
        );
    }
}
