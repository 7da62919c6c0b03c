//! Identity directory: phone + role to a stable user, and profile edits.

use uuid::Uuid;
use valet_domain::user::UserRole;

use crate::domain::repository::{Clock, UserRepository};
use crate::domain::types::{Actor, User};
use crate::error::ParkingServiceError;

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub struct IdentityDirectory<U, C>
where
    U: UserRepository,
    C: Clock,
{
    pub users: U,
    pub clock: C,
}

impl<U, C> IdentityDirectory<U, C>
where
    U: UserRepository,
    C: Clock,
{
    /// Return the user for `(phone, role)`, creating it on first sight.
    ///
    /// An existing user is returned unchanged; `name` and `venue_name` only
    /// seed a new record.
    pub async fn resolve_or_create(
        &self,
        phone: &str,
        role: UserRole,
        name: &str,
        venue_name: Option<&str>,
    ) -> Result<User, ParkingServiceError> {
        if let Some(user) = self.users.find_by_phone_role(phone, role).await? {
            return Ok(user);
        }

        let candidate = User {
            id: Uuid::new_v4(),
            phone: phone.to_owned(),
            name: name.trim().to_owned(),
            role,
            venue_name: match role {
                UserRole::Valet => non_blank(venue_name).map(str::to_owned),
                UserRole::Customer => None,
            },
            created_at: self.clock.now(),
        };
        self.users.insert_if_absent(&candidate).await?;

        // A concurrent login may have won the insert; read back whichever row exists.
        let user = self
            .users
            .find_by_phone_role(phone, role)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user {phone}/{role} missing after insert"))?;
        if user.id == candidate.id {
            tracing::info!(user_id = %user.id, role = %role, "user created");
        }
        Ok(user)
    }
}

// ── UpdateProfile ────────────────────────────────────────────────────────────

pub struct UpdateProfileInput {
    pub name: String,
    pub venue_name: Option<String>,
}

pub struct UpdateProfileUseCase<U>
where
    U: UserRepository,
{
    pub users: U,
}

impl<U> UpdateProfileUseCase<U>
where
    U: UserRepository,
{
    pub async fn execute(
        &self,
        actor: Actor,
        input: UpdateProfileInput,
    ) -> Result<User, ParkingServiceError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ParkingServiceError::InvalidArgument("name"));
        }
        self.users
            .update_profile(actor.user_id, name, non_blank(input.venue_name.as_deref()))
            .await?
            .ok_or(ParkingServiceError::UserNotFound)
    }
}
