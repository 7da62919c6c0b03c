use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use valet_auth_types::identity::Identity;

use crate::domain::types::Actor;
use crate::error::ParkingServiceError;
use crate::handlers::{ApiJson, parse_id};
use crate::handlers::views::{SessionDetailsView, SessionView};
use crate::infra::clock::SystemClock;
use crate::state::AppState;
use crate::usecase::session::{
    CreateSessionInput, CreateSessionUseCase, RejectParkingUseCase, RequestPickupUseCase,
    SessionCommand, TransitionSessionUseCase, VerifyDeliveryUseCase,
};
use crate::usecase::session_query::{
    GetActiveSessionUseCase, GetSessionUseCase, ListSessionsUseCase, SessionListing,
};

async fn run_command(
    state: &AppState,
    actor: Actor,
    raw_id: &str,
    command: SessionCommand,
) -> Result<Json<SessionView>, ParkingServiceError> {
    let session_id = parse_id(raw_id, "session_id")?;
    let usecase = TransitionSessionUseCase {
        sessions: state.session_repo(),
    };
    let session = usecase.execute(actor, session_id, command).await?;
    Ok(Json(SessionView::for_viewer(session, actor)))
}

async fn list(
    state: &AppState,
    actor: Actor,
    listing: SessionListing,
) -> Result<Json<Vec<SessionDetailsView>>, ParkingServiceError> {
    let usecase = ListSessionsUseCase {
        sessions: state.session_repo(),
        enricher: state.enricher(),
    };
    let sessions = usecase.execute(actor, listing).await?;
    Ok(Json(
        sessions
            .into_iter()
            .map(|details| SessionDetailsView::for_viewer(details, actor))
            .collect(),
    ))
}

// ── POST /api/sessions ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub vehicle_id: String,
    pub customer_id: Option<String>,
    pub venue_name: Option<String>,
}

pub async fn create_session(
    identity: Identity,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), ParkingServiceError> {
    let actor = Actor::from(identity);
    let input = CreateSessionInput {
        vehicle_id: parse_id(&body.vehicle_id, "vehicle_id")?,
        customer_id: body
            .customer_id
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_id(raw, "customer_id"))
            .transpose()?,
        venue_name: body.venue_name,
    };
    let usecase = CreateSessionUseCase {
        sessions: state.session_repo(),
        vehicles: state.vehicle_repo(),
        users: state.user_repo(),
        clock: SystemClock,
    };
    let session = usecase.execute(actor, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionView::for_viewer(session, actor)),
    ))
}

// ── Reads ────────────────────────────────────────────────────────────────────

pub async fn get_active_session(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<SessionDetailsView>, ParkingServiceError> {
    let actor = Actor::from(identity);
    let usecase = GetActiveSessionUseCase {
        sessions: state.session_repo(),
        enricher: state.enricher(),
    };
    let details = usecase.execute(actor).await?;
    Ok(Json(SessionDetailsView::for_viewer(details, actor)))
}

pub async fn get_session(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionDetailsView>, ParkingServiceError> {
    let actor = Actor::from(identity);
    let usecase = GetSessionUseCase {
        sessions: state.session_repo(),
        enricher: state.enricher(),
    };
    let details = usecase
        .execute(actor, parse_id(&id, "session_id")?)
        .await?;
    Ok(Json(SessionDetailsView::for_viewer(details, actor)))
}

pub async fn list_pending_pickups(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionDetailsView>>, ParkingServiceError> {
    list(&state, identity.into(), SessionListing::PendingPickups).await
}

pub async fn list_active_sessions(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionDetailsView>>, ParkingServiceError> {
    list(&state, identity.into(), SessionListing::AllActive).await
}

pub async fn list_history(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionDetailsView>>, ParkingServiceError> {
    list(&state, identity.into(), SessionListing::History).await
}

// ── Customer transitions ─────────────────────────────────────────────────────

pub async fn accept_parking(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ParkingServiceError> {
    run_command(&state, identity.into(), &id, SessionCommand::Accept).await
}

pub async fn reject_parking(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ParkingServiceError> {
    let usecase = RejectParkingUseCase {
        sessions: state.session_repo(),
    };
    usecase
        .execute(identity.into(), parse_id(&id, "session_id")?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn cancel_session(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ParkingServiceError> {
    run_command(&state, identity.into(), &id, SessionCommand::Cancel).await
}

#[derive(Serialize)]
pub struct RequestPickupResponse {
    pub session: SessionView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

pub async fn request_pickup(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RequestPickupResponse>, ParkingServiceError> {
    let actor = Actor::from(identity);
    let usecase = RequestPickupUseCase {
        sessions: state.session_repo(),
        users: state.user_repo(),
        notifier: state.notifier.clone(),
        clock: SystemClock,
    };
    let out = usecase
        .execute(actor, parse_id(&id, "session_id")?)
        .await?;
    Ok(Json(RequestPickupResponse {
        session: SessionView::for_viewer(out.session, actor),
        otp: state.echoed_code(out.code),
    }))
}

pub async fn cancel_pickup(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ParkingServiceError> {
    run_command(&state, identity.into(), &id, SessionCommand::CancelPickup).await
}

// ── Valet transitions ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyDeliveryRequest {
    pub otp: String,
}

pub async fn verify_delivery(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<VerifyDeliveryRequest>,
) -> Result<Json<SessionView>, ParkingServiceError> {
    let actor = Actor::from(identity);
    let usecase = VerifyDeliveryUseCase {
        sessions: state.session_repo(),
        clock: SystemClock,
    };
    let session = usecase
        .execute(actor, parse_id(&id, "session_id")?, &body.otp)
        .await?;
    Ok(Json(SessionView::for_viewer(session, actor)))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub parking_spot: Option<String>,
}

pub async fn update_status(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateStatusRequest>,
) -> Result<Json<SessionView>, ParkingServiceError> {
    let command = SessionCommand::valet_progress(&body.status, body.parking_spot)?;
    run_command(&state, identity.into(), &id, command).await
}
