use sea_orm::entity::prelude::*;

/// One vehicle's check-in to check-out record.
///
/// `live_vehicle_id` mirrors `vehicle_id` while the status is non-terminal and
/// is NULL afterwards. Its unique index allows one live session per vehicle.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "parking_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub ticket_number: String,
    pub vehicle_id: Uuid,
    pub customer_id: Uuid,
    pub valet_id: Uuid,
    pub venue_name: String,
    pub status: String,
    pub live_vehicle_id: Option<Uuid>,
    pub parked_at: chrono::DateTime<chrono::Utc>,
    pub requested_at: Option<chrono::DateTime<chrono::Utc>>,
    pub delivered_at: Option<chrono::DateTime<chrono::Utc>>,
    pub parking_spot: Option<String>,
    pub pickup_otp: Option<String>,
    pub pickup_otp_expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicles::Entity",
        from = "Column::VehicleId",
        to = "super::vehicles::Column::Id"
    )]
    Vehicle,
}

impl Related<super::vehicles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
