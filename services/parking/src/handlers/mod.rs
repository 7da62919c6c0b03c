pub mod auth;
pub mod health;
pub mod session;
pub mod vehicle;
pub mod views;

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use valet_auth_types::identity::Identity;

use crate::domain::types::Actor;
use crate::error::ParkingServiceError;

impl From<Identity> for Actor {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.user_id,
            role: identity.role,
        }
    }
}

/// Parse an identifier taken from a path or body.
pub(crate) fn parse_id(raw: &str, field: &'static str) -> Result<Uuid, ParkingServiceError> {
    raw.parse()
        .map_err(|_| ParkingServiceError::InvalidArgument(field))
}

/// JSON body extractor whose rejection carries the service error envelope.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ParkingServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(reason = %rejection, "rejected request body");
                Err(ParkingServiceError::InvalidArgument("body"))
            }
        }
    }
}
