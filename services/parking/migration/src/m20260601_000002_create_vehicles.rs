use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehicles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Vehicles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Vehicles::OwnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Vehicles::RegistrationNumber)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Vehicles::Make).string().not_null())
                    .col(ColumnDef::new(Vehicles::Model).string().not_null())
                    .col(ColumnDef::new(Vehicles::Color).string().not_null())
                    .col(ColumnDef::new(Vehicles::VehicleType).string().not_null())
                    .col(
                        ColumnDef::new(Vehicles::Photos)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Vehicles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Vehicles::Table, Vehicles::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Vehicles::Table)
                    .col(Vehicles::OwnerId)
                    .col(Vehicles::RegistrationNumber)
                    .unique()
                    .name("uq_vehicles_owner_registration")
                    .to_owned(),
            )
            .await?;

        // Valet-side search by plate across all owners.
        manager
            .create_index(
                Index::create()
                    .table(Vehicles::Table)
                    .col(Vehicles::RegistrationNumber)
                    .name("idx_vehicles_registration_number")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Vehicles {
    Table,
    Id,
    OwnerId,
    RegistrationNumber,
    Make,
    Model,
    Color,
    VehicleType,
    Photos,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
