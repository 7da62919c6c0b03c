//! Signed identity assertions (HS256 JWT).

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use valet_domain::user::UserRole;

/// Assertion lifetime in seconds (30 days).
pub const ASSERTION_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Identity extracted from a validated assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub user_id: Uuid,
    pub phone: String,
    pub role: UserRole,
    pub exp: i64,
}

/// Errors returned by [`issue_token`] and [`validate_token`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// JWT claims payload.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user id (UUID string) |
/// | `phone` | custom | phone the user logged in with |
/// | `role` | custom | `"customer"` or `"valet"` |
/// | `iat` | `iat` | issued at, seconds since epoch |
/// | `exp` | `exp` | expiry, seconds since epoch |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub phone: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

impl JwtClaims {
    /// Claims valid for [`ASSERTION_TTL_SECS`] from `issued_at`.
    pub fn new(user_id: Uuid, phone: impl Into<String>, role: UserRole, issued_at: i64) -> Self {
        Self {
            sub: user_id.to_string(),
            phone: phone.into(),
            role,
            iat: issued_at,
            exp: issued_at + ASSERTION_TTL_SECS,
        }
    }
}

/// Sign claims with HS256.
pub fn issue_token(claims: &JwtClaims, secret: &str) -> Result<String, AuthError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AuthError::Signing)
}

/// Decode and validate a JWT, returning raw claims.
///
/// HS256, `exp` checked with the default 60s leeway, `exp` and `sub` required.
fn decode_jwt(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

/// Validate a bearer token, returning the identity it carries.
pub fn validate_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let claims = decode_jwt(token, secret)?;
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AuthError::Malformed)?;
    Ok(TokenInfo {
        user_id,
        phone: claims.phone,
        role: claims.role,
        exp: claims.exp,
    })
}
