use uuid::Uuid;
use valet_domain::user::UserRole;
use valet_domain::vehicle::VehicleType;

use crate::domain::repository::{Clock, UserRepository, VehicleRepository};
use crate::domain::types::{Actor, User, Vehicle};
use crate::error::ParkingServiceError;

fn require_role(actor: Actor, role: UserRole) -> Result<(), ParkingServiceError> {
    if actor.role != role {
        return Err(ParkingServiceError::Forbidden);
    }
    Ok(())
}

fn required(value: &str, field: &'static str) -> Result<String, ParkingServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ParkingServiceError::InvalidArgument(field));
    }
    Ok(trimmed.to_owned())
}

// ── AddVehicle ───────────────────────────────────────────────────────────────

pub struct AddVehicleInput {
    pub registration_number: String,
    pub make: String,
    pub model: String,
    pub color: String,
    pub vehicle_type: String,
    pub photos: Vec<String>,
}

pub struct AddVehicleUseCase<V, C>
where
    V: VehicleRepository,
    C: Clock,
{
    pub vehicles: V,
    pub clock: C,
}

impl<V, C> AddVehicleUseCase<V, C>
where
    V: VehicleRepository,
    C: Clock,
{
    pub async fn execute(
        &self,
        actor: Actor,
        input: AddVehicleInput,
    ) -> Result<Vehicle, ParkingServiceError> {
        require_role(actor, UserRole::Customer)?;

        let vehicle_type: VehicleType = input
            .vehicle_type
            .parse()
            .map_err(|_| ParkingServiceError::InvalidArgument("vehicle_type"))?;

        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            owner_id: actor.user_id,
            registration_number: required(&input.registration_number, "registration_number")?,
            make: required(&input.make, "make")?,
            model: required(&input.model, "model")?,
            color: required(&input.color, "color")?,
            vehicle_type,
            photos: input
                .photos
                .into_iter()
                .filter(|p| !p.trim().is_empty())
                .collect(),
            created_at: self.clock.now(),
        };
        self.vehicles.insert(&vehicle).await?;
        tracing::info!(vehicle_id = %vehicle.id, owner_id = %vehicle.owner_id, "vehicle registered");
        Ok(vehicle)
    }
}

// ── ListVehicles ─────────────────────────────────────────────────────────────

pub struct ListVehiclesUseCase<V>
where
    V: VehicleRepository,
{
    pub vehicles: V,
}

impl<V> ListVehiclesUseCase<V>
where
    V: VehicleRepository,
{
    pub async fn execute(&self, actor: Actor) -> Result<Vec<Vehicle>, ParkingServiceError> {
        require_role(actor, UserRole::Customer)?;
        self.vehicles.list_by_owner(actor.user_id).await
    }
}

// ── SearchVehicle ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct VehicleWithOwner {
    pub vehicle: Vehicle,
    pub owner: Option<User>,
}

pub struct SearchVehicleUseCase<V, U>
where
    V: VehicleRepository,
    U: UserRepository,
{
    pub vehicles: V,
    pub users: U,
}

impl<V, U> SearchVehicleUseCase<V, U>
where
    V: VehicleRepository,
    U: UserRepository,
{
    /// Look up a plate at the desk. The owner is attached when it can be read.
    pub async fn execute(
        &self,
        actor: Actor,
        registration_number: &str,
    ) -> Result<VehicleWithOwner, ParkingServiceError> {
        require_role(actor, UserRole::Valet)?;
        let registration_number = required(registration_number, "registration_number")?;

        let vehicle = self
            .vehicles
            .find_by_registration(&registration_number)
            .await?
            .ok_or(ParkingServiceError::VehicleNotFound)?;

        let owner = match self.users.find_by_id(vehicle.owner_id).await {
            Ok(owner) => owner,
            Err(e) => {
                tracing::warn!(vehicle_id = %vehicle.id, error = %e, "owner lookup failed");
                None
            }
        };
        Ok(VehicleWithOwner { vehicle, owner })
    }
}
