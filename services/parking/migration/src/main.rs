use sea_orm_migration::prelude::*;
use valet_parking_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
