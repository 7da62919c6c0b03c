use chrono::{DateTime, Utc};
use uuid::Uuid;
use valet_domain::session::SessionStatus;
use valet_domain::user::UserRole;
use valet_domain::vehicle::VehicleType;

/// Login code lifetime in seconds.
pub const LOGIN_OTP_TTL_SECS: i64 = 300;

/// Pickup code lifetime in seconds.
pub const PICKUP_OTP_TTL_SECS: i64 = 1800;

/// Number of digits in every one-time code.
pub const OTP_DIGITS: usize = 6;

/// Maximum number of sessions returned by the history read.
pub const HISTORY_LIMIT: u64 = 50;

/// Verified caller of a use case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub phone: String,
    pub name: String,
    pub role: UserRole,
    /// Only meaningful for valets.
    pub venue_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub registration_number: String,
    pub make: String,
    pub model: String,
    pub color: String,
    pub vehicle_type: VehicleType,
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Live login code for a phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    pub phone: String,
    pub code: String,
    pub role: UserRole,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Code the customer hands to the valet at the desk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupOtp {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingSession {
    pub id: Uuid,
    pub ticket_number: String,
    pub vehicle_id: Uuid,
    pub customer_id: Uuid,
    pub valet_id: Uuid,
    /// Copied from the valet profile at creation and never revalidated.
    pub venue_name: String,
    pub status: SessionStatus,
    pub parked_at: DateTime<Utc>,
    pub requested_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub parking_spot: Option<String>,
    pub pickup_otp: Option<PickupOtp>,
}

impl ParkingSession {
    /// Value of the per-vehicle liveness key: the vehicle while the session is
    /// live, nothing once terminal.
    pub fn live_vehicle_id(&self) -> Option<Uuid> {
        (!self.status.is_terminal()).then_some(self.vehicle_id)
    }
}

/// Session plus best-effort lookups of everything it references.
#[derive(Debug, Clone)]
pub struct SessionDetails {
    pub session: ParkingSession,
    pub vehicle: Option<Vehicle>,
    pub customer: Option<User>,
    pub valet: Option<User>,
}

/// Output of the signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedAssertion {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Why a one-time code was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePurpose {
    Login,
    Pickup,
}

impl CodePurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Pickup => "pickup",
        }
    }
}

// ── Session store queries ────────────────────────────────────────────────────

/// Which side of a session a listing is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Customer(Uuid),
    Valet(Uuid),
}

impl Party {
    pub fn of(actor: Actor) -> Self {
        match actor.role {
            UserRole::Customer => Self::Customer(actor.user_id),
            UserRole::Valet => Self::Valet(actor.user_id),
        }
    }

    pub fn matches(self, session: &ParkingSession) -> bool {
        match self {
            Self::Customer(id) => session.customer_id == id,
            Self::Valet(id) => session.valet_id == id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    In(&'static [SessionStatus]),
    NotIn(&'static [SessionStatus]),
}

impl StatusFilter {
    pub fn matches(self, status: SessionStatus) -> bool {
        match self {
            Self::In(set) => set.contains(&status),
            Self::NotIn(set) => !set.contains(&status),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrder {
    /// `parked_at` descending.
    NewestParked,
    /// `requested_at` ascending.
    OldestRequested,
}

/// Ordered, optionally limited scan of the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionQuery {
    pub party: Option<Party>,
    pub statuses: StatusFilter,
    pub order: SessionOrder,
    pub limit: Option<u64>,
}

impl SessionQuery {
    pub fn matches(&self, session: &ParkingSession) -> bool {
        self.party.is_none_or(|party| party.matches(session))
            && self.statuses.matches(session.status)
    }
}

// ── Conditional writes ───────────────────────────────────────────────────────

/// Predicate a session must satisfy for a conditional write to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGuard {
    pub id: Uuid,
    pub statuses: &'static [SessionStatus],
    /// Set for owner-scoped transitions.
    pub customer_id: Option<Uuid>,
    /// Set when the write must race against a concurrent pickup-code change.
    pub pickup_otp: Option<String>,
}

impl SessionGuard {
    pub fn matches(&self, session: &ParkingSession) -> bool {
        session.id == self.id
            && self.statuses.contains(&session.status)
            && self.customer_id.is_none_or(|id| session.customer_id == id)
            && self.pickup_otp.as_deref().is_none_or(|code| {
                session
                    .pickup_otp
                    .as_ref()
                    .is_some_and(|otp| otp.code == code)
            })
    }
}

/// Tri-state update of an optional field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Keep,
    Set(T),
    Clear,
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Keep
    }
}

impl<T> Patch<T> {
    pub fn apply(self, field: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Set(value) => *field = Some(value),
            Self::Clear => *field = None,
        }
    }

    /// `None` for [`Patch::Keep`], otherwise the new field value.
    pub fn into_value(self) -> Option<Option<T>> {
        match self {
            Self::Keep => None,
            Self::Set(value) => Some(Some(value)),
            Self::Clear => Some(None),
        }
    }
}

/// Fields written by a conditional update. Status is always written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChange {
    pub status: SessionStatus,
    pub parking_spot: Patch<String>,
    pub requested_at: Patch<DateTime<Utc>>,
    pub delivered_at: Patch<DateTime<Utc>>,
    pub pickup_otp: Patch<PickupOtp>,
}

impl SessionChange {
    pub fn to(status: SessionStatus) -> Self {
        Self {
            status,
            parking_spot: Patch::Keep,
            requested_at: Patch::Keep,
            delivered_at: Patch::Keep,
            pickup_otp: Patch::Keep,
        }
    }

    pub fn apply(self, session: &mut ParkingSession) {
        session.status = self.status;
        self.parking_spot.apply(&mut session.parking_spot);
        self.requested_at.apply(&mut session.requested_at);
        self.delivered_at.apply(&mut session.delivered_at);
        self.pickup_otp.apply(&mut session.pickup_otp);
    }
}
