use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ParkingSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParkingSessions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ParkingSessions::TicketNumber)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ParkingSessions::VehicleId).uuid().not_null())
                    .col(ColumnDef::new(ParkingSessions::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(ParkingSessions::ValetId).uuid().not_null())
                    .col(ColumnDef::new(ParkingSessions::VenueName).string().not_null())
                    .col(ColumnDef::new(ParkingSessions::Status).string().not_null())
                    .col(ColumnDef::new(ParkingSessions::LiveVehicleId).uuid())
                    .col(
                        ColumnDef::new(ParkingSessions::ParkedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ParkingSessions::RequestedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ParkingSessions::DeliveredAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ParkingSessions::ParkingSpot).string())
                    .col(ColumnDef::new(ParkingSessions::PickupOtp).string())
                    .col(
                        ColumnDef::new(ParkingSessions::PickupOtpExpiresAt)
                            .timestamp_with_time_zone(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ParkingSessions::Table, ParkingSessions::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Liveness key: NULLs are distinct, so only non-terminal rows collide.
        manager
            .create_index(
                Index::create()
                    .table(ParkingSessions::Table)
                    .col(ParkingSessions::LiveVehicleId)
                    .unique()
                    .name("uq_parking_sessions_live_vehicle_id")
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("idx_parking_sessions_vehicle_id", ParkingSessions::VehicleId),
            ("idx_parking_sessions_customer_id", ParkingSessions::CustomerId),
            ("idx_parking_sessions_valet_id", ParkingSessions::ValetId),
            ("idx_parking_sessions_status", ParkingSessions::Status),
        ] {
            manager
                .create_index(
                    Index::create()
                        .table(ParkingSessions::Table)
                        .col(col)
                        .name(name)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParkingSessions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ParkingSessions {
    Table,
    Id,
    TicketNumber,
    VehicleId,
    CustomerId,
    ValetId,
    VenueName,
    Status,
    LiveVehicleId,
    ParkedAt,
    RequestedAt,
    DeliveredAt,
    ParkingSpot,
    PickupOtp,
    PickupOtpExpiresAt,
}

#[derive(Iden)]
enum Vehicles {
    Table,
    Id,
}
