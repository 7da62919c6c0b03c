use std::str::FromStr;

use anyhow::Context as _;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
};
use uuid::Uuid;
use valet_domain::user::UserRole;

use valet_parking_schema::{otp_challenges, parking_sessions, users, vehicles};

use crate::domain::repository::{
    OtpChallengeRepository, SessionRepository, UserRepository, VehicleRepository,
};
use crate::domain::types::{
    OtpChallenge, ParkingSession, Party, PickupOtp, SessionChange, SessionGuard, SessionOrder,
    SessionQuery, StatusFilter, User, Vehicle,
};
use crate::error::ParkingServiceError;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn parse_column<T>(value: &str, column: &'static str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("decode {column} column"))
}

// ── OTP challenge repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpChallengeRepository {
    pub db: DatabaseConnection,
}

impl OtpChallengeRepository for DbOtpChallengeRepository {
    async fn replace(&self, challenge: &OtpChallenge) -> Result<(), ParkingServiceError> {
        let model = otp_challenges::ActiveModel {
            phone: Set(challenge.phone.clone()),
            code: Set(challenge.code.clone()),
            role: Set(challenge.role.as_str().to_owned()),
            expires_at: Set(challenge.expires_at),
            created_at: Set(challenge.created_at),
        };
        otp_challenges::Entity::insert(model)
            .on_conflict(
                OnConflict::column(otp_challenges::Column::Phone)
                    .update_columns([
                        otp_challenges::Column::Code,
                        otp_challenges::Column::Role,
                        otp_challenges::Column::ExpiresAt,
                        otp_challenges::Column::CreatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("replace otp challenge")?;
        Ok(())
    }

    async fn find(
        &self,
        phone: &str,
        code: &str,
    ) -> Result<Option<OtpChallenge>, ParkingServiceError> {
        let model = otp_challenges::Entity::find()
            .filter(otp_challenges::Column::Phone.eq(phone))
            .filter(otp_challenges::Column::Code.eq(code))
            .one(&self.db)
            .await
            .context("find otp challenge")?;
        Ok(model.map(challenge_from_model).transpose()?)
    }

    async fn consume(&self, phone: &str, code: &str) -> Result<bool, ParkingServiceError> {
        let result = otp_challenges::Entity::delete_many()
            .filter(otp_challenges::Column::Phone.eq(phone))
            .filter(otp_challenges::Column::Code.eq(code))
            .exec(&self.db)
            .await
            .context("consume otp challenge")?;
        Ok(result.rows_affected > 0)
    }
}

fn challenge_from_model(model: otp_challenges::Model) -> anyhow::Result<OtpChallenge> {
    Ok(OtpChallenge {
        role: parse_column(&model.role, "otp_challenges.role")?,
        phone: model.phone,
        code: model.code,
        expires_at: model.expires_at,
        created_at: model.created_at,
    })
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ParkingServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model).transpose()?)
    }

    async fn find_by_phone_role(
        &self,
        phone: &str,
        role: UserRole,
    ) -> Result<Option<User>, ParkingServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Phone.eq(phone))
            .filter(users::Column::Role.eq(role.as_str()))
            .one(&self.db)
            .await
            .context("find user by phone and role")?;
        Ok(model.map(user_from_model).transpose()?)
    }

    async fn insert_if_absent(&self, user: &User) -> Result<(), ParkingServiceError> {
        let model = users::ActiveModel {
            id: Set(user.id),
            phone: Set(user.phone.clone()),
            name: Set(user.name.clone()),
            role: Set(user.role.as_str().to_owned()),
            venue_name: Set(user.venue_name.clone()),
            created_at: Set(user.created_at),
        };
        users::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([users::Column::Phone, users::Column::Role])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("insert user")?;
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        venue_name: Option<&str>,
    ) -> Result<Option<User>, ParkingServiceError> {
        let mut update = users::Entity::update_many()
            .col_expr(users::Column::Name, Expr::value(name))
            .filter(users::Column::Id.eq(id));
        if let Some(venue) = venue_name {
            update = update.col_expr(users::Column::VenueName, Expr::value(venue));
        }
        let result = update.exec(&self.db).await.context("update user profile")?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}

fn user_from_model(model: users::Model) -> anyhow::Result<User> {
    Ok(User {
        role: parse_column(&model.role, "users.role")?,
        id: model.id,
        phone: model.phone,
        name: model.name,
        venue_name: model.venue_name,
        created_at: model.created_at,
    })
}

// ── Vehicle repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVehicleRepository {
    pub db: DatabaseConnection,
}

impl VehicleRepository for DbVehicleRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, ParkingServiceError> {
        let model = vehicles::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find vehicle by id")?;
        Ok(model.map(vehicle_from_model).transpose()?)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Vehicle>, ParkingServiceError> {
        let models = vehicles::Entity::find()
            .filter(vehicles::Column::OwnerId.eq(owner_id))
            .order_by_desc(vehicles::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list vehicles by owner")?;
        Ok(models
            .into_iter()
            .map(vehicle_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn find_by_registration(
        &self,
        registration_number: &str,
    ) -> Result<Option<Vehicle>, ParkingServiceError> {
        let model = vehicles::Entity::find()
            .filter(vehicles::Column::RegistrationNumber.eq(registration_number))
            .order_by_desc(vehicles::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find vehicle by registration")?;
        Ok(model.map(vehicle_from_model).transpose()?)
    }

    async fn insert(&self, vehicle: &Vehicle) -> Result<(), ParkingServiceError> {
        let model = vehicles::ActiveModel {
            id: Set(vehicle.id),
            owner_id: Set(vehicle.owner_id),
            registration_number: Set(vehicle.registration_number.clone()),
            make: Set(vehicle.make.clone()),
            model: Set(vehicle.model.clone()),
            color: Set(vehicle.color.clone()),
            vehicle_type: Set(vehicle.vehicle_type.as_str().to_owned()),
            photos: Set(serde_json::json!(vehicle.photos)),
            created_at: Set(vehicle.created_at),
        };
        match model.insert(&self.db).await {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(ParkingServiceError::VehicleAlreadyRegistered),
            Err(e) => Err(anyhow::Error::new(e).context("insert vehicle").into()),
        }
    }
}

fn vehicle_from_model(model: vehicles::Model) -> anyhow::Result<Vehicle> {
    Ok(Vehicle {
        vehicle_type: parse_column(&model.vehicle_type, "vehicles.vehicle_type")?,
        photos: serde_json::from_value(model.photos).context("decode vehicles.photos column")?,
        id: model.id,
        owner_id: model.owner_id,
        registration_number: model.registration_number,
        make: model.make,
        model: model.model,
        color: model.color,
        created_at: model.created_at,
    })
}

// ── Session repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSessionRepository {
    pub db: DatabaseConnection,
}

fn guard_condition(guard: &SessionGuard) -> Condition {
    Condition::all()
        .add(parking_sessions::Column::Id.eq(guard.id))
        .add(parking_sessions::Column::Status.is_in(guard.statuses.iter().map(|s| s.as_str())))
        .add_option(
            guard
                .customer_id
                .map(|id| parking_sessions::Column::CustomerId.eq(id)),
        )
        .add_option(
            guard
                .pickup_otp
                .as_deref()
                .map(|code| parking_sessions::Column::PickupOtp.eq(code)),
        )
}

fn query_condition(query: &SessionQuery) -> Condition {
    let party = query.party.map(|party| match party {
        Party::Customer(id) => parking_sessions::Column::CustomerId.eq(id),
        Party::Valet(id) => parking_sessions::Column::ValetId.eq(id),
    });
    let statuses = match query.statuses {
        StatusFilter::In(set) => {
            parking_sessions::Column::Status.is_in(set.iter().map(|s| s.as_str()))
        }
        StatusFilter::NotIn(set) => {
            parking_sessions::Column::Status.is_not_in(set.iter().map(|s| s.as_str()))
        }
    };
    Condition::all().add_option(party).add(statuses)
}

impl SessionRepository for DbSessionRepository {
    async fn insert(&self, session: &ParkingSession) -> Result<(), ParkingServiceError> {
        let (pickup_otp, pickup_otp_expires_at) = match &session.pickup_otp {
            Some(otp) => (Some(otp.code.clone()), Some(otp.expires_at)),
            None => (None, None),
        };
        let model = parking_sessions::ActiveModel {
            id: Set(session.id),
            ticket_number: Set(session.ticket_number.clone()),
            vehicle_id: Set(session.vehicle_id),
            customer_id: Set(session.customer_id),
            valet_id: Set(session.valet_id),
            venue_name: Set(session.venue_name.clone()),
            status: Set(session.status.as_str().to_owned()),
            live_vehicle_id: Set(session.live_vehicle_id()),
            parked_at: Set(session.parked_at),
            requested_at: Set(session.requested_at),
            delivered_at: Set(session.delivered_at),
            parking_spot: Set(session.parking_spot.clone()),
            pickup_otp: Set(pickup_otp),
            pickup_otp_expires_at: Set(pickup_otp_expires_at),
        };
        match model.insert(&self.db).await {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(ParkingServiceError::SessionAlreadyActive),
            Err(e) => Err(anyhow::Error::new(e).context("insert parking session").into()),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ParkingSession>, ParkingServiceError> {
        let model = parking_sessions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find parking session by id")?;
        Ok(model.map(session_from_model).transpose()?)
    }

    async fn update_if(
        &self,
        guard: &SessionGuard,
        change: SessionChange,
    ) -> Result<bool, ParkingServiceError> {
        use parking_sessions::Column;

        let mut update = parking_sessions::Entity::update_many()
            .col_expr(Column::Status, Expr::value(change.status.as_str()))
            .filter(guard_condition(guard));
        if change.status.is_terminal() {
            update = update.col_expr(Column::LiveVehicleId, Expr::value(Option::<Uuid>::None));
        }
        if let Some(spot) = change.parking_spot.into_value() {
            update = update.col_expr(Column::ParkingSpot, Expr::value(spot));
        }
        if let Some(at) = change.requested_at.into_value() {
            update = update.col_expr(Column::RequestedAt, Expr::value(at));
        }
        if let Some(at) = change.delivered_at.into_value() {
            update = update.col_expr(Column::DeliveredAt, Expr::value(at));
        }
        if let Some(otp) = change.pickup_otp.into_value() {
            let (code, expires_at) = match otp {
                Some(otp) => (Some(otp.code), Some(otp.expires_at)),
                None => (None, None),
            };
            update = update
                .col_expr(Column::PickupOtp, Expr::value(code))
                .col_expr(Column::PickupOtpExpiresAt, Expr::value(expires_at));
        }

        let result = update
            .exec(&self.db)
            .await
            .context("conditional update of parking session")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_if(&self, guard: &SessionGuard) -> Result<bool, ParkingServiceError> {
        let result = parking_sessions::Entity::delete_many()
            .filter(guard_condition(guard))
            .exec(&self.db)
            .await
            .context("conditional delete of parking session")?;
        Ok(result.rows_affected > 0)
    }

    async fn list(&self, query: &SessionQuery) -> Result<Vec<ParkingSession>, ParkingServiceError> {
        let mut select = parking_sessions::Entity::find().filter(query_condition(query));
        select = match query.order {
            SessionOrder::NewestParked => {
                select.order_by_desc(parking_sessions::Column::ParkedAt)
            }
            SessionOrder::OldestRequested => select
                .order_by_asc(parking_sessions::Column::RequestedAt)
                .order_by_asc(parking_sessions::Column::ParkedAt),
        };
        let models = select
            .limit(query.limit)
            .all(&self.db)
            .await
            .context("list parking sessions")?;
        Ok(models
            .into_iter()
            .map(session_from_model)
            .collect::<anyhow::Result<_>>()?)
    }
}

fn session_from_model(model: parking_sessions::Model) -> anyhow::Result<ParkingSession> {
    let pickup_otp = match (model.pickup_otp, model.pickup_otp_expires_at) {
        (Some(code), Some(expires_at)) if !code.is_empty() => Some(PickupOtp { code, expires_at }),
        _ => None,
    };
    Ok(ParkingSession {
        status: parse_column(&model.status, "parking_sessions.status")?,
        id: model.id,
        ticket_number: model.ticket_number,
        vehicle_id: model.vehicle_id,
        customer_id: model.customer_id,
        valet_id: model.valet_id,
        venue_name: model.venue_name,
        parked_at: model.parked_at,
        requested_at: model.requested_at,
        delivered_at: model.delivered_at,
        parking_spot: model.parking_spot,
        pickup_otp,
    })
}
