//! Create `vehicle` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehicle::Table)
                    .if_not_exists()
                    .col(integer(Vehicle::Id).primary_key().auto_increment())
                    .col(string_len(Vehicle::LicensePlate, 32).unique_key().not_null())
                    .col(string_len(Vehicle::Model, 128).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Vehicle::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Vehicle { Table, Id, LicensePlate, Model }
