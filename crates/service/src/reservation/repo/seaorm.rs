use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDateTime;
use common::pagination::Pagination;
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{debug, warn};

use crate::db::reservation_queries as queries;
use crate::errors::ServiceError;
use crate::reservation::domain::{NewReservation, Reservation, ReservationStatus, ReservationUpdate, User, Vehicle};
use crate::reservation::repository::{ReservationStore, UserStore, VehicleStore};
use crate::reservation::service::ReservationService;

/// Relational store over a pooled connection or an open transaction.
pub struct SeaOrmStore<C> {
    db: Arc<C>,
}

impl<C> SeaOrmStore<C> {
    pub fn new(db: Arc<C>) -> Self { Self { db } }
}

pub type SeaOrmReservationService<C> = ReservationService<SeaOrmStore<C>, SeaOrmStore<C>, SeaOrmStore<C>>;

#[async_trait::async_trait]
impl<C: ConnectionTrait + Send + Sync + 'static> ReservationStore for SeaOrmStore<C> {
    async fn find_by_id(&self, id: i32) -> Result<Option<Reservation>, ServiceError> {
        queries::find_by_id(self.db.as_ref(), id).await
    }

    async fn find_by_reservation_id(&self, reservation_id: &str) -> Result<Option<Reservation>, ServiceError> {
        queries::find_by_reservation_id(self.db.as_ref(), reservation_id).await
    }

    async fn find_by_user(&self, user_id: i32) -> Result<Vec<Reservation>, ServiceError> {
        queries::list_by_user(self.db.as_ref(), user_id).await
    }

    async fn find_by_vehicle(&self, vehicle_id: i32) -> Result<Vec<Reservation>, ServiceError> {
        queries::list_by_vehicle(self.db.as_ref(), vehicle_id).await
    }

    async fn find_by_status(&self, status: ReservationStatus) -> Result<Vec<Reservation>, ServiceError> {
        queries::list_by_status(self.db.as_ref(), status).await
    }

    async fn find_by_start_time_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<Reservation>, ServiceError> {
        queries::list_by_start_time_between(self.db.as_ref(), start, end).await
    }

    async fn find_all(&self) -> Result<Vec<Reservation>, ServiceError> {
        queries::list(self.db.as_ref(), None).await
    }

    async fn find_page(&self, page: Pagination) -> Result<Vec<Reservation>, ServiceError> {
        queries::list_paginated(self.db.as_ref(), page).await
    }

    async fn exists_by_id(&self, id: i32) -> Result<bool, ServiceError> {
        queries::exists_by_id(self.db.as_ref(), id).await
    }

    async fn exists_by_reservation_id(&self, reservation_id: &str) -> Result<bool, ServiceError> {
        queries::exists_by_reservation_id(self.db.as_ref(), reservation_id).await
    }

    async fn save(&self, reservation: Reservation) -> Result<Reservation, ServiceError> {
        queries::save(self.db.as_ref(), reservation).await
    }

    async fn delete_by_id(&self, id: i32) -> Result<bool, ServiceError> {
        queries::delete_by_id(self.db.as_ref(), id).await
    }
}

#[async_trait::async_trait]
impl<C: ConnectionTrait + Send + Sync + 'static> UserStore for SeaOrmStore<C> {
    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, ServiceError> {
        queries::find_user(self.db.as_ref(), id).await
    }
}

#[async_trait::async_trait]
impl<C: ConnectionTrait + Send + Sync + 'static> VehicleStore for SeaOrmStore<C> {
    async fn find_vehicle_by_id(&self, id: i32) -> Result<Option<Vehicle>, ServiceError> {
        queries::find_vehicle(self.db.as_ref(), id).await
    }
}

/// Reservation service over a database: mutations each run in their own
/// transaction, reads go straight to the pool.
#[derive(Clone)]
pub struct SeaOrmReservations {
    db: DatabaseConnection,
    reads: SeaOrmReservationService<DatabaseConnection>,
}

impl SeaOrmReservations {
    pub fn new(db: DatabaseConnection) -> Self {
        let reads = ReservationService::from_store(Arc::new(SeaOrmStore::new(Arc::new(db.clone()))));
        Self { db, reads }
    }

    /// Run `op` against a service bound to a fresh transaction. Commits on `Ok`,
    /// rolls back on `Err`.
    ///
    /// The service handed to `op` must not outlive it.
    pub async fn atomically<T, F, Fut>(&self, op: F) -> Result<T, ServiceError>
    where
        F: FnOnce(SeaOrmReservationService<DatabaseTransaction>) -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let txn = Arc::new(self.db.begin().await?);
        let svc = ReservationService::from_store(Arc::new(SeaOrmStore::new(Arc::clone(&txn))));
        let outcome = op(svc).await;

        let txn = Arc::try_unwrap(txn)
            .map_err(|_| ServiceError::Db("transaction escaped its unit of work".into()))?;
        match outcome {
            Ok(value) => {
                txn.commit().await?;
                Ok(value)
            }
            Err(e) => {
                debug!(error = %e, "rolling back");
                if let Err(rb) = txn.rollback().await {
                    warn!(error = %rb, "rollback failed");
                }
                Err(e)
            }
        }
    }

    pub async fn create_reservation(&self, new: NewReservation) -> Result<Reservation, ServiceError> {
        self.atomically(|svc| async move { svc.create_reservation(new).await }).await
    }

    pub async fn update_reservation(&self, id: i32, update: ReservationUpdate) -> Result<Reservation, ServiceError> {
        self.atomically(|svc| async move { svc.update_reservation(id, update).await }).await
    }

    pub async fn delete_reservation(&self, id: i32) -> Result<(), ServiceError> {
        self.atomically(|svc| async move { svc.delete_reservation(id).await }).await
    }

    pub async fn get_reservation_by_id(&self, id: i32) -> Result<Option<Reservation>, ServiceError> {
        self.reads.get_reservation_by_id(id).await
    }

    pub async fn get_reservation_by_reservation_id(&self, reservation_id: &str) -> Result<Option<Reservation>, ServiceError> {
        self.reads.get_reservation_by_reservation_id(reservation_id).await
    }

    pub async fn get_reservations_by_user(&self, user: &User) -> Result<Vec<Reservation>, ServiceError> {
        self.reads.get_reservations_by_user(user).await
    }

    pub async fn get_reservations_by_vehicle(&self, vehicle: &Vehicle) -> Result<Vec<Reservation>, ServiceError> {
        self.reads.get_reservations_by_vehicle(vehicle).await
    }

    pub async fn get_reservations_by_status(&self, status: ReservationStatus) -> Result<Vec<Reservation>, ServiceError> {
        self.reads.get_reservations_by_status(status).await
    }

    pub async fn get_reservations_by_time_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<Reservation>, ServiceError> {
        self.reads.get_reservations_by_time_range(start, end).await
    }

    pub async fn get_all_reservations(&self) -> Result<Vec<Reservation>, ServiceError> {
        self.reads.get_all_reservations().await
    }

    pub async fn list_reservations_paginated(&self, page: Pagination) -> Result<Vec<Reservation>, ServiceError> {
        self.reads.list_reservations_paginated(page).await
    }

    pub async fn exists_by_reservation_id(&self, reservation_id: &str) -> Result<bool, ServiceError> {
        self.reads.exists_by_reservation_id(reservation_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    async fn seed(db: &DatabaseConnection) -> anyhow::Result<(User, Vehicle)> {
        let tag = uuid::Uuid::new_v4().simple().to_string();
        let u = models::user::create(db, "Ada", &format!("ada_{tag}@example.com")).await?;
        let v = models::vehicle::create(db, &tag[..12], "Model 3").await?;
        Ok((u.into(), v.into()))
    }

    fn new_reservation(reservation_id: &str, user: &User, vehicle: &Vehicle) -> NewReservation {
        NewReservation {
            reservation_id: reservation_id.into(),
            user_id: user.id,
            vehicle_id: vehicle.id,
            spot_id: "A1".into(),
            start_time: at(1, 10),
            end_time: at(1, 12),
            status: ReservationStatus::Pending,
        }
    }

    fn unique_rid() -> String { format!("R-{}", uuid::Uuid::new_v4().simple()) }

    #[tokio::test]
    async fn create_is_committed_and_duplicate_rejected() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let (user, vehicle) = seed(&db).await?;
        let svc = SeaOrmReservations::new(db);
        let rid = unique_rid();

        let created = svc.create_reservation(new_reservation(&rid, &user, &vehicle)).await?;
        let id = created.id.expect("id assigned");
        assert_eq!(svc.get_reservation_by_id(id).await?, Some(created.clone()));
        assert!(svc.exists_by_reservation_id(&rid).await?);

        let err = svc.create_reservation(new_reservation(&rid, &user, &vehicle)).await.unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists(_)), "{err}");
        assert_eq!(svc.get_reservations_by_user(&user).await?, vec![created]);
        Ok(())
    }

    #[tokio::test]
    async fn missing_references_persist_nothing() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let (user, vehicle) = seed(&db).await?;
        let svc = SeaOrmReservations::new(db);

        let mut no_user = new_reservation(&unique_rid(), &user, &vehicle);
        no_user.user_id = i32::MAX;
        let err = svc.create_reservation(no_user.clone()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)), "{err}");
        assert!(!svc.exists_by_reservation_id(&no_user.reservation_id).await?);

        let mut no_vehicle = new_reservation(&unique_rid(), &user, &vehicle);
        no_vehicle.vehicle_id = i32::MAX;
        let err = svc.create_reservation(no_vehicle.clone()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)), "{err}");
        assert!(!svc.exists_by_reservation_id(&no_vehicle.reservation_id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn zero_length_window_and_long_identifier_are_stored() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let (user, vehicle) = seed(&db).await?;
        let svc = SeaOrmReservations::new(db);

        let rid = format!("{}-{}", unique_rid(), "R".repeat(65));
        let mut new = new_reservation(&rid, &user, &vehicle);
        new.end_time = new.start_time;
        new.spot_id = "S".repeat(65);
        let created = svc.create_reservation(new).await?;

        let stored = svc.get_reservation_by_reservation_id(&rid).await?.expect("row present");
        assert_eq!(stored, created);
        assert_eq!(stored.start_time, stored.end_time);
        Ok(())
    }

    #[tokio::test]
    async fn failed_unit_of_work_rolls_back_earlier_writes() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let (user, vehicle) = seed(&db).await?;
        let svc = SeaOrmReservations::new(db);
        let rid = unique_rid();

        let new = new_reservation(&rid, &user, &vehicle);
        let res: Result<(), ServiceError> = svc
            .atomically(|tx| async move {
                tx.create_reservation(new).await?;
                Err::<(), _>(ServiceError::Validation("abort".into()))
            })
            .await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        assert!(!svc.exists_by_reservation_id(&rid).await?);
        assert!(svc.get_reservations_by_user(&user).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn update_and_delete_round() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let (user, vehicle) = seed(&db).await?;
        let svc = SeaOrmReservations::new(db);
        let created = svc.create_reservation(new_reservation(&unique_rid(), &user, &vehicle)).await?;
        let id = created.id.unwrap();

        let update = ReservationUpdate {
            spot_id: "B7".into(),
            start_time: at(3, 9),
            end_time: at(3, 17),
            status: ReservationStatus::Active,
        };
        let updated = svc.update_reservation(id, update).await?;
        assert_eq!(updated.reservation_id, created.reservation_id);
        assert_eq!(updated.user, created.user);
        assert_eq!(svc.get_reservation_by_id(id).await?, Some(updated));

        let in_range = svc.get_reservations_by_time_range(at(3, 9), at(3, 9)).await?;
        assert!(in_range.iter().any(|r| r.id == Some(id)));
        assert!(svc.get_reservations_by_time_range(at(3, 10), at(3, 9)).await?.is_empty());

        svc.delete_reservation(id).await?;
        assert_eq!(svc.get_reservation_by_id(id).await?, None);
        assert!(matches!(svc.delete_reservation(id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            svc.update_reservation(id, ReservationUpdate { spot_id: "B7".into(), start_time: at(3, 9), end_time: at(3, 17), status: ReservationStatus::Cancelled }).await,
            Err(ServiceError::NotFound(_))
        ));
        Ok(())
    }
}
