#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;
use valet_domain::user::UserRole;

use crate::domain::types::{
    CodePurpose, OtpChallenge, ParkingSession, SessionChange, SessionGuard, SessionQuery,
    SignedAssertion, User, Vehicle,
};
use crate::error::ParkingServiceError;

/// Login challenges, at most one per phone.
pub trait OtpChallengeRepository: Send + Sync {
    /// Store `challenge`, replacing any challenge held for the same phone.
    async fn replace(&self, challenge: &OtpChallenge) -> Result<(), ParkingServiceError>;

    /// Find the challenge for `phone` whose code equals `code`.
    async fn find(
        &self,
        phone: &str,
        code: &str,
    ) -> Result<Option<OtpChallenge>, ParkingServiceError>;

    /// Delete the challenge if it still carries `code`. Returns `false` when
    /// another caller consumed or replaced it first.
    async fn consume(&self, phone: &str, code: &str) -> Result<bool, ParkingServiceError>;
}

pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ParkingServiceError>;

    async fn find_by_phone_role(
        &self,
        phone: &str,
        role: UserRole,
    ) -> Result<Option<User>, ParkingServiceError>;

    /// Insert unless a user with the same `(phone, role)` already exists.
    async fn insert_if_absent(&self, user: &User) -> Result<(), ParkingServiceError>;

    /// Set `name`, and `venue_name` when given. Returns `None` if the user is gone.
    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        venue_name: Option<&str>,
    ) -> Result<Option<User>, ParkingServiceError>;
}

pub trait VehicleRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, ParkingServiceError>;

    /// Newest first.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Vehicle>, ParkingServiceError>;

    async fn find_by_registration(
        &self,
        registration_number: &str,
    ) -> Result<Option<Vehicle>, ParkingServiceError>;

    /// Fails with `VehicleAlreadyRegistered` when the owner already has the plate.
    async fn insert(&self, vehicle: &Vehicle) -> Result<(), ParkingServiceError>;
}

/// Parking session collection.
///
/// Every mutation is a single conditional write; callers never read-modify-write.
pub trait SessionRepository: Send + Sync {
    /// Fails with `SessionAlreadyActive` when the vehicle already has a live session.
    async fn insert(&self, session: &ParkingSession) -> Result<(), ParkingServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ParkingSession>, ParkingServiceError>;

    /// Apply `change` if the stored session satisfies `guard`. Returns whether it did.
    async fn update_if(
        &self,
        guard: &SessionGuard,
        change: SessionChange,
    ) -> Result<bool, ParkingServiceError>;

    /// Delete the session if it satisfies `guard`. Returns whether it did.
    async fn delete_if(&self, guard: &SessionGuard) -> Result<bool, ParkingServiceError>;

    async fn list(&self, query: &SessionQuery) -> Result<Vec<ParkingSession>, ParkingServiceError>;
}

/// Wall clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Out-of-band delivery of one-time codes.
pub trait Notifier: Send + Sync {
    async fn send_code(&self, phone: &str, code: &str, purpose: CodePurpose)
    -> anyhow::Result<()>;
}

/// Mints identity assertions.
pub trait Signer: Send + Sync {
    fn sign(
        &self,
        user: &User,
        issued_at: DateTime<Utc>,
    ) -> Result<SignedAssertion, ParkingServiceError>;
}
