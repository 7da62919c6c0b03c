//! Bearer-token identity extractor.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use http::request::Parts;
use uuid::Uuid;
use valet_core::error::AppError;
use valet_domain::user::UserRole;

use crate::token::validate_token;

/// HMAC secret used to validate assertions. Provide it from the router state
/// with `FromRef`.
#[derive(Debug, Clone)]
pub struct TokenSecret(pub Arc<str>);

impl TokenSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }
}

/// Verified caller identity from `Authorization: Bearer <jwt>`.
///
/// Rejects with 401 when the header is absent or the token does not validate.
/// Role checks (403) happen in the use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl<S> FromRequestParts<S> for Identity
where
    TokenSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    // Resolve everything synchronously and hand back a 'static future so the
    // returned future does not borrow `parts`.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = TokenSecret::from_ref(state);
        let bearer = parts.headers.typed_get::<Authorization<Bearer>>();

        let result = match bearer {
            Some(Authorization(bearer)) => validate_token(bearer.token(), &secret.0)
                .map(|info| Self {
                    user_id: info.user_id,
                    role: info.role,
                })
                .map_err(|err| {
                    tracing::debug!(error = %err, "rejected bearer token");
                    AppError::Unauthorized
                }),
            None => Err(AppError::Unauthorized),
        };

        async move { result }
    }
}
