use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Parking service error variants.
#[derive(Debug, thiserror::Error)]
pub enum ParkingServiceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("user not found")]
    UserNotFound,
    #[error("vehicle not found")]
    VehicleNotFound,
    #[error("session not found")]
    SessionNotFound,
    #[error("vehicle already registered")]
    VehicleAlreadyRegistered,
    #[error("vehicle already has an active parking session")]
    SessionAlreadyActive,
    #[error("session is not in a state that allows this operation")]
    SessionStateConflict,
    #[error("invalid code")]
    InvalidCredential,
    #[error("code expired")]
    CredentialExpired,
    #[error("no pickup code issued for this session")]
    NoChallengeIssued,
    #[error("forbidden")]
    Forbidden,
    #[error("storage unavailable")]
    Unavailable(#[from] anyhow::Error),
}

impl ParkingServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::VehicleNotFound => "VEHICLE_NOT_FOUND",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::VehicleAlreadyRegistered => "VEHICLE_ALREADY_REGISTERED",
            Self::SessionAlreadyActive => "SESSION_ALREADY_ACTIVE",
            Self::SessionStateConflict => "SESSION_STATE_CONFLICT",
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::CredentialExpired => "CREDENTIAL_EXPIRED",
            Self::NoChallengeIssued => "NO_CHALLENGE_ISSUED",
            Self::Forbidden => "FORBIDDEN",
            Self::Unavailable(_) => "UNAVAILABLE",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) | Self::NoChallengeIssued => StatusCode::BAD_REQUEST,
            Self::UserNotFound | Self::VehicleNotFound | Self::SessionNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::VehicleAlreadyRegistered
            | Self::SessionAlreadyActive
            | Self::SessionStateConflict => StatusCode::CONFLICT,
            Self::InvalidCredential | Self::CredentialExpired => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ParkingServiceError {
    fn into_response(self) -> Response {
        // TraceLayer already records every status; only storage failures carry
        // a cause worth logging.
        if let Self::Unavailable(ref e) = self {
            tracing::error!(error = format!("{e:#}"), kind = "UNAVAILABLE", "storage failure");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (self.status(), axum::Json(body)).into_response()
    }
}
