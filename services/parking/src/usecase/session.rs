//! Session lifecycle engine.
//!
//! Each operation checks the caller's role against the transition table, then
//! issues one conditional write guarded by the allowed source statuses. A
//! write that matches nothing is classified by re-reading the session. No
//! operation retries.

use chrono::{DateTime, Duration, Utc};
use rand::RngExt;
use uuid::Uuid;
use valet_domain::session::{SessionStatus, Transition};
use valet_domain::user::UserRole;

use crate::domain::repository::{
    Clock, Notifier, SessionRepository, UserRepository, VehicleRepository,
};
use crate::domain::types::{
    Actor, CodePurpose, PICKUP_OTP_TTL_SECS, ParkingSession, Patch, PickupOtp, SessionChange,
    SessionGuard,
};
use crate::error::ParkingServiceError;
use crate::usecase::otp::{codes_match, generate_code};

/// Human-facing ticket: `YYYYMMDD-<0..99999>`. Collisions are tolerated.
pub fn ticket_number(now: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    format!("{}-{}", now.format("%Y%m%d"), rng.random_range(0..100_000u32))
}

fn authorize(actor: Actor, transition: Transition) -> Result<(), ParkingServiceError> {
    if actor.role != transition.actor() {
        return Err(ParkingServiceError::Forbidden);
    }
    Ok(())
}

fn guard_for(actor: Actor, transition: Transition, id: Uuid) -> SessionGuard {
    SessionGuard {
        id,
        statuses: transition.allowed_from(),
        customer_id: transition.is_owner_scoped().then_some(actor.user_id),
        pickup_otp: None,
    }
}

/// Explain why a guarded write matched nothing.
async fn classify_miss<S>(sessions: &S, guard: &SessionGuard) -> ParkingServiceError
where
    S: SessionRepository,
{
    match sessions.find_by_id(guard.id).await {
        Err(e) => e,
        Ok(None) => ParkingServiceError::SessionNotFound,
        Ok(Some(current)) if guard.customer_id.is_some_and(|id| id != current.customer_id) => {
            ParkingServiceError::Forbidden
        }
        Ok(Some(current)) => {
            tracing::debug!(
                session_id = %current.id,
                status = %current.status,
                "transition precondition failed"
            );
            ParkingServiceError::SessionStateConflict
        }
    }
}

/// Apply one guarded update and return the stored result.
async fn apply<S>(
    sessions: &S,
    guard: SessionGuard,
    change: SessionChange,
) -> Result<ParkingSession, ParkingServiceError>
where
    S: SessionRepository,
{
    let status = change.status;
    if !sessions.update_if(&guard, change).await? {
        return Err(classify_miss(sessions, &guard).await);
    }
    tracing::info!(session_id = %guard.id, status = %status, "session transitioned");
    sessions
        .find_by_id(guard.id)
        .await?
        .ok_or(ParkingServiceError::SessionNotFound)
}

// ── CreateSession ────────────────────────────────────────────────────────────

pub struct CreateSessionInput {
    pub vehicle_id: Uuid,
    /// Defaults to the vehicle owner; must equal it when supplied.
    pub customer_id: Option<Uuid>,
    /// Used only when the valet profile has no venue.
    pub venue_name: Option<String>,
}

pub struct CreateSessionUseCase<S, V, U, C>
where
    S: SessionRepository,
    V: VehicleRepository,
    U: UserRepository,
    C: Clock,
{
    pub sessions: S,
    pub vehicles: V,
    pub users: U,
    pub clock: C,
}

impl<S, V, U, C> CreateSessionUseCase<S, V, U, C>
where
    S: SessionRepository,
    V: VehicleRepository,
    U: UserRepository,
    C: Clock,
{
    pub async fn execute(
        &self,
        actor: Actor,
        input: CreateSessionInput,
    ) -> Result<ParkingSession, ParkingServiceError> {
        if actor.role != UserRole::Valet {
            return Err(ParkingServiceError::Forbidden);
        }

        let vehicle = self
            .vehicles
            .find_by_id(input.vehicle_id)
            .await?
            .ok_or(ParkingServiceError::VehicleNotFound)?;

        let customer_id = input.customer_id.unwrap_or(vehicle.owner_id);
        if customer_id != vehicle.owner_id {
            return Err(ParkingServiceError::InvalidArgument("customer_id"));
        }

        let profile_venue = self
            .users
            .find_by_id(actor.user_id)
            .await?
            .and_then(|valet| valet.venue_name);
        let venue_name = [profile_venue, input.venue_name]
            .into_iter()
            .flatten()
            .map(|v| v.trim().to_owned())
            .find(|v| !v.is_empty())
            .ok_or(ParkingServiceError::InvalidArgument("venue_name"))?;

        let now = self.clock.now();
        let session = ParkingSession {
            id: Uuid::new_v4(),
            ticket_number: ticket_number(now),
            vehicle_id: vehicle.id,
            customer_id,
            valet_id: actor.user_id,
            venue_name,
            status: SessionStatus::INITIAL,
            parked_at: now,
            requested_at: None,
            delivered_at: None,
            parking_spot: None,
            pickup_otp: None,
        };
        self.sessions.insert(&session).await?;
        tracing::info!(
            session_id = %session.id,
            vehicle_id = %session.vehicle_id,
            ticket = %session.ticket_number,
            "session created"
        );
        Ok(session)
    }
}

// ── Status-only transitions ──────────────────────────────────────────────────

/// Transitions that only move the status (plus the fields noted per variant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Accept,
    AdvanceParkingMoving,
    /// Blank or absent spot keeps the previous one.
    MarkParked {
        parking_spot: Option<String>,
    },
    Cancel,
    /// Clears `requested_at` and the pickup code.
    CancelPickup,
    AdvanceMoving,
    MarkAvailable,
}

impl SessionCommand {
    /// Map the valet status-update body onto a command.
    pub fn valet_progress(
        status: &str,
        parking_spot: Option<String>,
    ) -> Result<Self, ParkingServiceError> {
        match status.parse::<SessionStatus>() {
            Ok(SessionStatus::ParkingMoving) => Ok(Self::AdvanceParkingMoving),
            Ok(SessionStatus::Parked) => Ok(Self::MarkParked { parking_spot }),
            Ok(SessionStatus::Moving) => Ok(Self::AdvanceMoving),
            Ok(SessionStatus::Available) => Ok(Self::MarkAvailable),
            _ => Err(ParkingServiceError::InvalidArgument("status")),
        }
    }

    pub fn transition(&self) -> Transition {
        match self {
            Self::Accept => Transition::AcceptParking,
            Self::AdvanceParkingMoving => Transition::AdvanceParkingMoving,
            Self::MarkParked { .. } => Transition::MarkParked,
            Self::Cancel => Transition::CancelSession,
            Self::CancelPickup => Transition::CancelPickup,
            Self::AdvanceMoving => Transition::AdvanceMoving,
            Self::MarkAvailable => Transition::MarkAvailable,
        }
    }

    fn into_change(self) -> SessionChange {
        match self {
            Self::Accept => SessionChange::to(SessionStatus::Picked),
            Self::AdvanceParkingMoving => SessionChange::to(SessionStatus::ParkingMoving),
            Self::MarkParked { parking_spot } => SessionChange {
                parking_spot: parking_spot
                    .map(|s| s.trim().to_owned())
                    .filter(|s| !s.is_empty())
                    .map_or(Patch::Keep, Patch::Set),
                ..SessionChange::to(SessionStatus::Parked)
            },
            Self::Cancel => SessionChange::to(SessionStatus::Cancelled),
            Self::CancelPickup => SessionChange {
                requested_at: Patch::Clear,
                pickup_otp: Patch::Clear,
                ..SessionChange::to(SessionStatus::Parked)
            },
            Self::AdvanceMoving => SessionChange::to(SessionStatus::Moving),
            Self::MarkAvailable => SessionChange::to(SessionStatus::Available),
        }
    }
}

pub struct TransitionSessionUseCase<S>
where
    S: SessionRepository,
{
    pub sessions: S,
}

impl<S> TransitionSessionUseCase<S>
where
    S: SessionRepository,
{
    pub async fn execute(
        &self,
        actor: Actor,
        session_id: Uuid,
        command: SessionCommand,
    ) -> Result<ParkingSession, ParkingServiceError> {
        let transition = command.transition();
        authorize(actor, transition)?;
        let guard = guard_for(actor, transition, session_id);
        apply(&self.sessions, guard, command.into_change()).await
    }
}

// ── RejectParking ────────────────────────────────────────────────────────────

pub struct RejectParkingUseCase<S>
where
    S: SessionRepository,
{
    pub sessions: S,
}

impl<S> RejectParkingUseCase<S>
where
    S: SessionRepository,
{
    /// Hard-delete a session the customer never accepted.
    pub async fn execute(&self, actor: Actor, session_id: Uuid) -> Result<(), ParkingServiceError> {
        authorize(actor, Transition::RejectParking)?;
        let guard = guard_for(actor, Transition::RejectParking, session_id);
        if !self.sessions.delete_if(&guard).await? {
            return Err(classify_miss(&self.sessions, &guard).await);
        }
        tracing::info!(session_id = %session_id, "session rejected");
        Ok(())
    }
}

// ── RequestPickup ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RequestPickupOutput {
    pub session: ParkingSession,
    pub code: String,
}

pub struct RequestPickupUseCase<S, U, N, C>
where
    S: SessionRepository,
    U: UserRepository,
    N: Notifier,
    C: Clock,
{
    pub sessions: S,
    pub users: U,
    pub notifier: N,
    pub clock: C,
}

impl<S, U, N, C> RequestPickupUseCase<S, U, N, C>
where
    S: SessionRepository,
    U: UserRepository,
    N: Notifier,
    C: Clock,
{
    pub async fn execute(
        &self,
        actor: Actor,
        session_id: Uuid,
    ) -> Result<RequestPickupOutput, ParkingServiceError> {
        authorize(actor, Transition::RequestPickup)?;

        let now = self.clock.now();
        let code = generate_code();
        let change = SessionChange {
            requested_at: Patch::Set(now),
            pickup_otp: Patch::Set(PickupOtp {
                code: code.clone(),
                expires_at: now + Duration::seconds(PICKUP_OTP_TTL_SECS),
            }),
            ..SessionChange::to(SessionStatus::Requested)
        };
        let guard = guard_for(actor, Transition::RequestPickup, session_id);
        let session = apply(&self.sessions, guard, change).await?;

        self.notify(actor.user_id, &code).await;
        Ok(RequestPickupOutput { session, code })
    }

    async fn notify(&self, customer_id: Uuid, code: &str) {
        let phone = match self.users.find_by_id(customer_id).await {
            Ok(Some(user)) => user.phone,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(user_id = %customer_id, error = %e, "pickup code recipient lookup failed");
                return;
            }
        };
        if let Err(e) = self
            .notifier
            .send_code(&phone, code, CodePurpose::Pickup)
            .await
        {
            tracing::warn!(user_id = %customer_id, error = format!("{e:#}"), "pickup code delivery failed");
        }
    }
}

// ── VerifyDelivery ───────────────────────────────────────────────────────────

pub struct VerifyDeliveryUseCase<S, C>
where
    S: SessionRepository,
    C: Clock,
{
    pub sessions: S,
    pub clock: C,
}

impl<S, C> VerifyDeliveryUseCase<S, C>
where
    S: SessionRepository,
    C: Clock,
{
    /// Hand the vehicle back once the customer's pickup code checks out.
    ///
    /// Guards run in order: a code was issued, it matches, it has not expired.
    /// The final write also requires the stored code to be unchanged, so a
    /// concurrent cancel or re-request turns into a conflict.
    pub async fn execute(
        &self,
        actor: Actor,
        session_id: Uuid,
        code: &str,
    ) -> Result<ParkingSession, ParkingServiceError> {
        authorize(actor, Transition::VerifyDelivery)?;
        let code = code.trim();
        if code.is_empty() {
            return Err(ParkingServiceError::InvalidArgument("otp"));
        }

        let session = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or(ParkingServiceError::SessionNotFound)?;

        let otp = session
            .pickup_otp
            .ok_or(ParkingServiceError::NoChallengeIssued)?;
        if !codes_match(code, &otp.code) {
            return Err(ParkingServiceError::InvalidCredential);
        }
        let now = self.clock.now();
        if now > otp.expires_at {
            return Err(ParkingServiceError::CredentialExpired);
        }

        let guard = SessionGuard {
            pickup_otp: Some(otp.code),
            ..guard_for(actor, Transition::VerifyDelivery, session_id)
        };
        let change = SessionChange {
            delivered_at: Patch::Set(now),
            pickup_otp: Patch::Clear,
            ..SessionChange::to(SessionStatus::Delivered)
        };
        apply(&self.sessions, guard, change).await
    }
}
