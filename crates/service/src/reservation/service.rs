use std::sync::Arc;

use chrono::NaiveDateTime;
use common::pagination::Pagination;
use tracing::{debug, info, instrument};

use super::domain::{NewReservation, Reservation, ReservationStatus, ReservationUpdate, User, Vehicle};
use super::repository::{ReservationStore, UserStore, VehicleStore};
use crate::errors::ServiceError;

/// Reservation business service independent of the backing stores.
///
/// Holds no mutable state of its own. Mutating operations are meant to run in
/// one unit of work; `repo::seaorm::SeaOrmReservations` provides that boundary
/// for the relational stores.
pub struct ReservationService<R, U, V> {
    reservations: Arc<R>,
    users: Arc<U>,
    vehicles: Arc<V>,
}

impl<R, U, V> Clone for ReservationService<R, U, V> {
    fn clone(&self) -> Self {
        Self {
            reservations: Arc::clone(&self.reservations),
            users: Arc::clone(&self.users),
            vehicles: Arc::clone(&self.vehicles),
        }
    }
}

impl<S> ReservationService<S, S, S>
where
    S: ReservationStore + UserStore + VehicleStore,
{
    /// Build over a single store that serves reservations, users and vehicles.
    pub fn from_store(store: Arc<S>) -> Self {
        Self::new(Arc::clone(&store), Arc::clone(&store), store)
    }
}

impl<R: ReservationStore, U: UserStore, V: VehicleStore> ReservationService<R, U, V> {
    pub fn new(reservations: Arc<R>, users: Arc<U>, vehicles: Arc<V>) -> Self {
        Self { reservations, users, vehicles }
    }

    /// Create a reservation for an existing user and vehicle.
    ///
    /// Fails with `AlreadyExists` when the external identifier is taken, then
    /// `NotFound` when the user or the vehicle does not resolve.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use chrono::NaiveDate;
    /// use service::reservation::{NewReservation, ReservationService, ReservationStatus};
    /// use service::reservation::repository::memory::InMemoryStore;
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let user = store.add_user("Ada", "ada@example.com");
    /// let vehicle = store.add_vehicle("EV-001", "Model 3");
    /// let svc = ReservationService::from_store(store);
    /// let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    /// let new = NewReservation {
    ///     reservation_id: "R-1".into(),
    ///     user_id: user.id,
    ///     vehicle_id: vehicle.id,
    ///     spot_id: "A1".into(),
    ///     start_time: day.and_hms_opt(10, 0, 0).unwrap(),
    ///     end_time: day.and_hms_opt(12, 0, 0).unwrap(),
    ///     status: ReservationStatus::Pending,
    /// };
    /// let created = tokio_test::block_on(svc.create_reservation(new.clone())).unwrap();
    /// assert!(created.id.is_some());
    /// assert!(tokio_test::block_on(svc.create_reservation(new)).is_err());
    /// ```
    #[instrument(skip(self, new), fields(reservation_id = %new.reservation_id, user_id = new.user_id, vehicle_id = new.vehicle_id))]
    pub async fn create_reservation(&self, new: NewReservation) -> Result<Reservation, ServiceError> {
        if self.reservations.exists_by_reservation_id(&new.reservation_id).await? {
            debug!("reservation id already taken");
            return Err(ServiceError::already_exists("reservation", &new.reservation_id));
        }

        let user = self.users
            .find_user_by_id(new.user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", new.user_id))?;

        let vehicle = self.vehicles
            .find_vehicle_by_id(new.vehicle_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("vehicle", new.vehicle_id))?;

        let saved = self.reservations.save(Reservation::from_new(new, user, vehicle)).await?;
        info!(id = ?saved.id, spot_id = %saved.spot_id, status = %saved.status, "reservation_created");
        Ok(saved)
    }

    /// Overwrite spot, start, end and status of an existing reservation.
    /// The only failure besides the store's own is `NotFound`.
    #[instrument(skip(self, update), fields(status = %update.status))]
    pub async fn update_reservation(&self, id: i32, update: ReservationUpdate) -> Result<Reservation, ServiceError> {
        let mut existing = self.reservations
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("reservation", id))?;

        existing.apply(update);
        let saved = self.reservations.save(existing).await?;
        info!(reservation_id = %saved.reservation_id, "reservation_updated");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn delete_reservation(&self, id: i32) -> Result<(), ServiceError> {
        if !self.reservations.exists_by_id(id).await? {
            return Err(ServiceError::not_found("reservation", id));
        }
        if !self.reservations.delete_by_id(id).await? {
            // removed concurrently between the check and the delete
            return Err(ServiceError::not_found("reservation", id));
        }
        info!("reservation_deleted");
        Ok(())
    }

    pub async fn get_reservation_by_id(&self, id: i32) -> Result<Option<Reservation>, ServiceError> {
        self.reservations.find_by_id(id).await
    }

    pub async fn get_reservation_by_reservation_id(&self, reservation_id: &str) -> Result<Option<Reservation>, ServiceError> {
        self.reservations.find_by_reservation_id(reservation_id).await
    }

    pub async fn get_reservations_by_user(&self, user: &User) -> Result<Vec<Reservation>, ServiceError> {
        self.reservations.find_by_user(user.id).await
    }

    pub async fn get_reservations_by_vehicle(&self, vehicle: &Vehicle) -> Result<Vec<Reservation>, ServiceError> {
        self.reservations.find_by_vehicle(vehicle.id).await
    }

    pub async fn get_reservations_by_status(&self, status: ReservationStatus) -> Result<Vec<Reservation>, ServiceError> {
        self.reservations.find_by_status(status).await
    }

    /// Reservations whose start time lies in `[start, end]`. An inverted range is empty.
    #[instrument(skip(self))]
    pub async fn get_reservations_by_time_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<Reservation>, ServiceError> {
        if start > end {
            debug!("inverted time range");
            return Ok(Vec::new());
        }
        self.reservations.find_by_start_time_between(start, end).await
    }

    pub async fn get_all_reservations(&self) -> Result<Vec<Reservation>, ServiceError> {
        self.reservations.find_all().await
    }

    /// One page of `get_all_reservations`.
    pub async fn list_reservations_paginated(&self, page: Pagination) -> Result<Vec<Reservation>, ServiceError> {
        self.reservations.find_page(page).await
    }

    pub async fn exists_by_reservation_id(&self, reservation_id: &str) -> Result<bool, ServiceError> {
        self.reservations.exists_by_reservation_id(reservation_id).await
    }
}
