//! Session-identity boundary
//!
//! The platform's password and session logic live in an external provider;
//! this module only validates the Bearer token it issues and derives the
//! caller's identity from the verified claims. Ownership checks downstream
//! must use this identity, never ids supplied in request bodies.

use bson::oid::ObjectId;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::db::schemas::OwnerKind;
use crate::error::RefugeError;

/// Verified caller identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: ObjectId,
    pub user_type: OwnerKind,
}

/// Claims carried by the session provider's tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account id (ObjectId hex)
    pub sub: String,
    /// Owner kind of the account
    #[serde(rename = "userType")]
    pub user_type: String,
    /// Expiry (unix seconds)
    pub exp: u64,
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_token_from_header(header: Option<&str>) -> Option<&str> {
    header?.strip_prefix("Bearer ").map(str::trim)
}

/// Validate the session token and derive the caller identity.
///
/// Any failure (missing header, bad signature, expired token, malformed
/// claims) is an authorization error; the claimed identity is untrusted
/// input until the signature has been verified.
pub fn authenticate(auth_header: Option<&str>, secret: &str) -> Result<Identity, RefugeError> {
    let token = extract_token_from_header(auth_header)
        .ok_or_else(|| RefugeError::Authorization("missing bearer token".into()))?;

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| RefugeError::Authorization(format!("invalid session token: {}", e)))?;

    let user_id = ObjectId::parse_str(&decoded.claims.sub)
        .map_err(|_| RefugeError::Authorization("malformed account id in token".into()))?;

    let user_type = OwnerKind::parse(&decoded.claims.user_type)
        .ok_or_else(|| RefugeError::Authorization("unknown account kind in token".into()))?;

    Ok(Identity { user_id, user_type })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn token_for(sub: &str, user_type: &str, exp: u64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            user_type: user_type.to_string(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn far_future() -> u64 {
        4102444800 // 2100-01-01
    }

    #[test]
    fn test_valid_token_yields_identity() {
        let oid = ObjectId::new();
        let token = token_for(&oid.to_hex(), "veterinarian", far_future());
        let header = format!("Bearer {}", token);

        let identity = authenticate(Some(&header), SECRET).unwrap();
        assert_eq!(identity.user_id, oid);
        assert_eq!(identity.user_type, OwnerKind::Veterinarian);
    }

    #[test]
    fn test_missing_header_is_authorization_error() {
        let err = authenticate(None, SECRET).unwrap_err();
        assert!(matches!(err, RefugeError::Authorization(_)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = token_for(&ObjectId::new().to_hex(), "user", far_future());
        let header = format!("Bearer {}", token);
        let err = authenticate(Some(&header), "other-secret").unwrap_err();
        assert!(matches!(err, RefugeError::Authorization(_)));
    }

    #[test]
    fn test_unknown_owner_kind_rejected() {
        let token = token_for(&ObjectId::new().to_hex(), "admin", far_future());
        let header = format!("Bearer {}", token);
        let err = authenticate(Some(&header), SECRET).unwrap_err();
        assert!(matches!(err, RefugeError::Authorization(_)));
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token_from_header(Some("Bearer abc")), Some("abc"));
        assert_eq!(extract_token_from_header(Some("Basic abc")), None);
        assert_eq!(extract_token_from_header(None), None);
    }
}
