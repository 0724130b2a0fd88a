//! Create `reservation` table with FKs to `user` and `vehicle`.
//!
//! `reservation_id` is the caller-supplied identifier and must stay unique.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reservation::Table)
                    .if_not_exists()
                    .col(integer(Reservation::Id).primary_key().auto_increment())
                    .col(string(Reservation::ReservationId).unique_key().not_null())
                    .col(integer(Reservation::UserId).not_null())
                    .col(integer(Reservation::VehicleId).not_null())
                    .col(string(Reservation::SpotId).not_null())
                    .col(timestamp(Reservation::StartTime).not_null())
                    .col(timestamp(Reservation::EndTime).not_null())
                    .col(string_len(Reservation::Status, 16).not_null())
                    .col(timestamp_with_time_zone(Reservation::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Reservation::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservation_user")
                            .from(Reservation::Table, Reservation::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservation_vehicle")
                            .from(Reservation::Table, Reservation::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Reservation::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Reservation {
    Table,
    Id,
    ReservationId,
    UserId,
    VehicleId,
    SpotId,
    StartTime,
    EndTime,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Vehicle { Table, Id }
