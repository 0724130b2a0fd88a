use std::collections::{BTreeSet, HashMap};

use chrono::{NaiveDateTime, Utc};
use common::pagination::Pagination;
use models::{reservation, user, vehicle};
use sea_orm::sea_query::SimpleExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, NotSet, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};

use crate::errors::ServiceError;
use crate::reservation::domain::{Reservation, ReservationStatus, User, Vehicle};

/// Map driver errors onto service errors; constraint violations keep their meaning.
fn map_db_err(e: DbErr, reservation_id: &str) -> ServiceError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::already_exists("reservation", reservation_id),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
            ServiceError::NotFound(format!("referenced user or vehicle missing: {msg}"))
        }
        _ => ServiceError::Db(e.to_string()),
    }
}

pub async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<User>, ServiceError> {
    Ok(user::Entity::find_by_id(id).one(db).await?.map(User::from))
}

pub async fn find_vehicle<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<Vehicle>, ServiceError> {
    Ok(vehicle::Entity::find_by_id(id).one(db).await?.map(Vehicle::from))
}

/// Attach users and vehicles to reservation rows, two queries per batch.
pub async fn hydrate<C: ConnectionTrait>(db: &C, rows: Vec<reservation::Model>) -> Result<Vec<Reservation>, ServiceError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let user_ids: BTreeSet<i32> = rows.iter().map(|r| r.user_id).collect();
    let vehicle_ids: BTreeSet<i32> = rows.iter().map(|r| r.vehicle_id).collect();

    let users: HashMap<i32, User> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, User::from(u)))
        .collect();
    let vehicles: HashMap<i32, Vehicle> = vehicle::Entity::find()
        .filter(vehicle::Column::Id.is_in(vehicle_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|v| (v.id, Vehicle::from(v)))
        .collect();

    rows.into_iter()
        .map(|row| -> Result<Reservation, ServiceError> {
            let status = row.status()?;
            let user = users
                .get(&row.user_id)
                .cloned()
                .ok_or_else(|| ServiceError::Db(format!("reservation {} references missing user {}", row.id, row.user_id)))?;
            let vehicle = vehicles
                .get(&row.vehicle_id)
                .cloned()
                .ok_or_else(|| ServiceError::Db(format!("reservation {} references missing vehicle {}", row.id, row.vehicle_id)))?;
            Ok(Reservation {
                id: Some(row.id),
                reservation_id: row.reservation_id,
                user,
                vehicle,
                spot_id: row.spot_id,
                start_time: row.start_time,
                end_time: row.end_time,
                status,
            })
        })
        .collect()
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<Reservation>, ServiceError> {
    let row = reservation::Entity::find_by_id(id).one(db).await?;
    Ok(hydrate(db, row.into_iter().collect()).await?.pop())
}

pub async fn find_by_reservation_id<C: ConnectionTrait>(db: &C, reservation_id: &str) -> Result<Option<Reservation>, ServiceError> {
    let row = reservation::Entity::find()
        .filter(reservation::Column::ReservationId.eq(reservation_id))
        .one(db)
        .await?;
    Ok(hydrate(db, row.into_iter().collect()).await?.pop())
}

/// All reservations matching `cond`, ordered by surrogate id. `None` lists everything.
pub async fn list<C: ConnectionTrait>(db: &C, cond: Option<SimpleExpr>) -> Result<Vec<Reservation>, ServiceError> {
    let mut query = reservation::Entity::find();
    if let Some(cond) = cond {
        query = query.filter(cond);
    }
    let rows = query.order_by_asc(reservation::Column::Id).all(db).await?;
    hydrate(db, rows).await
}

pub async fn list_by_user<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<Reservation>, ServiceError> {
    list(db, Some(reservation::Column::UserId.eq(user_id))).await
}

pub async fn list_by_vehicle<C: ConnectionTrait>(db: &C, vehicle_id: i32) -> Result<Vec<Reservation>, ServiceError> {
    list(db, Some(reservation::Column::VehicleId.eq(vehicle_id))).await
}

pub async fn list_by_status<C: ConnectionTrait>(db: &C, status: ReservationStatus) -> Result<Vec<Reservation>, ServiceError> {
    list(db, Some(reservation::Column::Status.eq(status.as_str()))).await
}

/// `BETWEEN` is inclusive on both ends.
pub async fn list_by_start_time_between<C: ConnectionTrait>(db: &C, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<Reservation>, ServiceError> {
    list(db, Some(reservation::Column::StartTime.between(start, end))).await
}

/// List reservations with pagination, ordered by surrogate id.
pub async fn list_paginated<C: ConnectionTrait>(db: &C, opts: Pagination) -> Result<Vec<Reservation>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let rows = reservation::Entity::find()
        .order_by_asc(reservation::Column::Id)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await?;
    hydrate(db, rows).await
}

pub async fn exists_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<bool, ServiceError> {
    let n = reservation::Entity::find()
        .filter(reservation::Column::Id.eq(id))
        .count(db)
        .await?;
    Ok(n > 0)
}

pub async fn exists_by_reservation_id<C: ConnectionTrait>(db: &C, reservation_id: &str) -> Result<bool, ServiceError> {
    let n = reservation::Entity::find()
        .filter(reservation::Column::ReservationId.eq(reservation_id))
        .count(db)
        .await?;
    Ok(n > 0)
}

/// Insert a new row or overwrite an existing one; `created_at` is never touched on update.
pub async fn save<C: ConnectionTrait>(db: &C, mut r: Reservation) -> Result<Reservation, ServiceError> {
    let now = Utc::now().into();
    let saved = match r.id {
        None => {
            let am = reservation::ActiveModel {
                id: NotSet,
                reservation_id: Set(r.reservation_id.clone()),
                user_id: Set(r.user.id),
                vehicle_id: Set(r.vehicle.id),
                spot_id: Set(r.spot_id.clone()),
                start_time: Set(r.start_time),
                end_time: Set(r.end_time),
                status: Set(r.status.to_string()),
                created_at: Set(now),
                updated_at: Set(now),
            };
            am.insert(db).await.map_err(|e| map_db_err(e, &r.reservation_id))?
        }
        Some(id) => {
            let existing = reservation::Entity::find_by_id(id)
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::not_found("reservation", id))?;
            let mut am: reservation::ActiveModel = existing.into();
            am.reservation_id = Set(r.reservation_id.clone());
            am.user_id = Set(r.user.id);
            am.vehicle_id = Set(r.vehicle.id);
            am.spot_id = Set(r.spot_id.clone());
            am.start_time = Set(r.start_time);
            am.end_time = Set(r.end_time);
            am.status = Set(r.status.to_string());
            am.updated_at = Set(now);
            am.update(db).await.map_err(|e| match e {
                DbErr::RecordNotUpdated => ServiceError::not_found("reservation", id),
                other => map_db_err(other, &r.reservation_id),
            })?
        }
    };
    r.id = Some(saved.id);
    Ok(r)
}

pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<bool, ServiceError> {
    let res = reservation::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}
