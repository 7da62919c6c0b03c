//! Read side: session lookups with best-effort enrichment.

use uuid::Uuid;
use valet_domain::session::{PICKUP_STATUSES, TERMINAL_STATUSES};
use valet_domain::user::UserRole;

use crate::domain::repository::{SessionRepository, UserRepository, VehicleRepository};
use crate::domain::types::{
    Actor, HISTORY_LIMIT, ParkingSession, Party, SessionDetails, SessionOrder, SessionQuery,
    StatusFilter,
};
use crate::error::ParkingServiceError;

/// Discard a failed or empty lookup, leaving a trace of it.
fn best_effort<T>(
    result: Result<Option<T>, ParkingServiceError>,
    what: &'static str,
    id: Uuid,
) -> Option<T> {
    match result {
        Ok(Some(found)) => Some(found),
        Ok(None) => {
            tracing::warn!(%id, what, "referenced record missing");
            None
        }
        Err(e) => {
            tracing::warn!(%id, what, error = %e, "enrichment lookup failed");
            None
        }
    }
}

/// Attaches vehicle, customer and valet to sessions. Never fails.
pub struct SessionEnricher<V, U>
where
    V: VehicleRepository,
    U: UserRepository,
{
    pub vehicles: V,
    pub users: U,
}

impl<V, U> SessionEnricher<V, U>
where
    V: VehicleRepository,
    U: UserRepository,
{
    pub async fn enrich(&self, session: ParkingSession) -> SessionDetails {
        let (vehicle, customer, valet) = futures::join!(
            self.vehicles.find_by_id(session.vehicle_id),
            self.users.find_by_id(session.customer_id),
            self.users.find_by_id(session.valet_id),
        );
        SessionDetails {
            vehicle: best_effort(vehicle, "vehicle", session.vehicle_id),
            customer: best_effort(customer, "customer", session.customer_id),
            valet: best_effort(valet, "valet", session.valet_id),
            session,
        }
    }

    pub async fn enrich_all(&self, sessions: Vec<ParkingSession>) -> Vec<SessionDetails> {
        futures::future::join_all(sessions.into_iter().map(|s| self.enrich(s))).await
    }
}

fn require_valet(actor: Actor) -> Result<(), ParkingServiceError> {
    if actor.role != UserRole::Valet {
        return Err(ParkingServiceError::Forbidden);
    }
    Ok(())
}

// ── GetSession ───────────────────────────────────────────────────────────────

pub struct GetSessionUseCase<S, V, U>
where
    S: SessionRepository,
    V: VehicleRepository,
    U: UserRepository,
{
    pub sessions: S,
    pub enricher: SessionEnricher<V, U>,
}

impl<S, V, U> GetSessionUseCase<S, V, U>
where
    S: SessionRepository,
    V: VehicleRepository,
    U: UserRepository,
{
    /// Customers may only read their own sessions; valets may read any.
    pub async fn execute(
        &self,
        actor: Actor,
        session_id: Uuid,
    ) -> Result<SessionDetails, ParkingServiceError> {
        let session = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or(ParkingServiceError::SessionNotFound)?;
        if actor.role == UserRole::Customer && session.customer_id != actor.user_id {
            return Err(ParkingServiceError::Forbidden);
        }
        Ok(self.enricher.enrich(session).await)
    }
}

// ── GetActiveSession ─────────────────────────────────────────────────────────

pub struct GetActiveSessionUseCase<S, V, U>
where
    S: SessionRepository,
    V: VehicleRepository,
    U: UserRepository,
{
    pub sessions: S,
    pub enricher: SessionEnricher<V, U>,
}

impl<S, V, U> GetActiveSessionUseCase<S, V, U>
where
    S: SessionRepository,
    V: VehicleRepository,
    U: UserRepository,
{
    /// Most recently parked live session on the caller's side of the desk.
    pub async fn execute(&self, actor: Actor) -> Result<SessionDetails, ParkingServiceError> {
        let query = SessionQuery {
            party: Some(Party::of(actor)),
            statuses: StatusFilter::NotIn(TERMINAL_STATUSES),
            order: SessionOrder::NewestParked,
            limit: Some(1),
        };
        let session = self
            .sessions
            .list(&query)
            .await?
            .into_iter()
            .next()
            .ok_or(ParkingServiceError::SessionNotFound)?;
        Ok(self.enricher.enrich(session).await)
    }
}

// ── Listings ─────────────────────────────────────────────────────────────────

/// Which listing to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionListing {
    /// Valet queue of requested/moving/available sessions, oldest request first.
    PendingPickups,
    /// Every live session, newest first. Valet only.
    AllActive,
    /// The caller's finished sessions, newest first, capped.
    History,
}

impl SessionListing {
    fn query(self, actor: Actor) -> Result<SessionQuery, ParkingServiceError> {
        match self {
            Self::PendingPickups => {
                require_valet(actor)?;
                Ok(SessionQuery {
                    party: None,
                    statuses: StatusFilter::In(PICKUP_STATUSES),
                    order: SessionOrder::OldestRequested,
                    limit: None,
                })
            }
            Self::AllActive => {
                require_valet(actor)?;
                Ok(SessionQuery {
                    party: None,
                    statuses: StatusFilter::NotIn(TERMINAL_STATUSES),
                    order: SessionOrder::NewestParked,
                    limit: None,
                })
            }
            Self::History => Ok(SessionQuery {
                party: Some(Party::of(actor)),
                statuses: StatusFilter::In(TERMINAL_STATUSES),
                order: SessionOrder::NewestParked,
                limit: Some(HISTORY_LIMIT),
            }),
        }
    }
}

pub struct ListSessionsUseCase<S, V, U>
where
    S: SessionRepository,
    V: VehicleRepository,
    U: UserRepository,
{
    pub sessions: S,
    pub enricher: SessionEnricher<V, U>,
}

impl<S, V, U> ListSessionsUseCase<S, V, U>
where
    S: SessionRepository,
    V: VehicleRepository,
    U: UserRepository,
{
    pub async fn execute(
        &self,
        actor: Actor,
        listing: SessionListing,
    ) -> Result<Vec<SessionDetails>, ParkingServiceError> {
        let query = listing.query(actor)?;
        let sessions = self.sessions.list(&query).await?;
        Ok(self.enricher.enrich_all(sessions).await)
    }
}
