use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use valet_auth_types::identity::Identity;

use crate::error::ParkingServiceError;
use crate::handlers::ApiJson;
use crate::handlers::views::UserView;
use crate::state::AppState;
use crate::usecase::directory::{UpdateProfileInput, UpdateProfileUseCase};
use crate::usecase::login::{
    CompleteLoginInput, CompleteLoginUseCase, RequestLoginInput, RequestLoginUseCase,
};

// ── POST /api/auth/send-otp ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendOtpRequest {
    pub phone: String,
    pub role: String,
}

#[derive(Serialize)]
pub struct SendOtpResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

pub async fn send_otp(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>, ParkingServiceError> {
    let usecase = RequestLoginUseCase {
        store: state.otp_store(),
        notifier: state.notifier.clone(),
    };
    let code = usecase
        .execute(RequestLoginInput {
            phone: body.phone,
            role: body.role,
        })
        .await?;
    Ok(Json(SendOtpResponse {
        message: "OTP sent",
        otp: state.echoed_code(code),
    }))
}

// ── POST /api/auth/verify-otp ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub phone: String,
    pub otp: String,
    pub name: Option<String>,
    pub venue_name: Option<String>,
}

#[derive(Serialize)]
pub struct VerifyOtpResponse {
    pub token: String,
    #[serde(serialize_with = "valet_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
    pub user: UserView,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, ParkingServiceError> {
    let usecase = CompleteLoginUseCase {
        store: state.otp_store(),
        directory: state.directory(),
        signer: state.signer(),
    };
    let out = usecase
        .execute(CompleteLoginInput {
            phone: body.phone,
            code: body.otp,
            name: body.name,
            venue_name: body.venue_name,
        })
        .await?;
    Ok(Json(VerifyOtpResponse {
        token: out.assertion.token,
        expires_at: out.assertion.expires_at,
        user: out.user.into(),
    }))
}

// ── PUT /api/auth/profile ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub venue_name: Option<String>,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: UserView,
}

pub async fn update_profile(
    identity: Identity,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ParkingServiceError> {
    let usecase = UpdateProfileUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(
            identity.into(),
            UpdateProfileInput {
                name: body.name,
                venue_name: body.venue_name,
            },
        )
        .await?;
    Ok(Json(ProfileResponse { user: user.into() }))
}
