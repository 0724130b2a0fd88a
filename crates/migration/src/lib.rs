//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_user;
mod m20240101_000002_create_vehicle;
mod m20240101_000003_create_reservation;
mod m20240101_000004_add_reservation_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_user::Migration),
            Box::new(m20240101_000002_create_vehicle::Migration),
            Box::new(m20240101_000003_create_reservation::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000004_add_reservation_indexes::Migration),
        ]
    }
}
