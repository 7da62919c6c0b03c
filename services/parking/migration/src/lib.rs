use sea_orm_migration::prelude::*;

mod m20260601_000001_create_users;
mod m20260601_000002_create_vehicles;
mod m20260601_000003_create_parking_sessions;
mod m20260601_000004_create_otp_challenges;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260601_000001_create_users::Migration),
            Box::new(m20260601_000002_create_vehicles::Migration),
            Box::new(m20260601_000003_create_parking_sessions::Migration),
            Box::new(m20260601_000004_create_otp_challenges::Migration),
        ]
    }
}
