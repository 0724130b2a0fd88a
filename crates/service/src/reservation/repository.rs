use async_trait::async_trait;
use chrono::NaiveDateTime;
use common::pagination::Pagination;

use super::domain::{Reservation, ReservationStatus, User, Vehicle};
use crate::errors::ServiceError;

/// Keyed storage for reservation records.
///
/// List lookups return records ordered by surrogate id.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Reservation>, ServiceError>;
    async fn find_by_reservation_id(&self, reservation_id: &str) -> Result<Option<Reservation>, ServiceError>;
    async fn find_by_user(&self, user_id: i32) -> Result<Vec<Reservation>, ServiceError>;
    async fn find_by_vehicle(&self, vehicle_id: i32) -> Result<Vec<Reservation>, ServiceError>;
    async fn find_by_status(&self, status: ReservationStatus) -> Result<Vec<Reservation>, ServiceError>;
    /// Start time within `[start, end]`, both ends inclusive.
    async fn find_by_start_time_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<Reservation>, ServiceError>;
    async fn find_all(&self) -> Result<Vec<Reservation>, ServiceError>;
    async fn find_page(&self, page: Pagination) -> Result<Vec<Reservation>, ServiceError>;

    async fn exists_by_id(&self, id: i32) -> Result<bool, ServiceError>;
    async fn exists_by_reservation_id(&self, reservation_id: &str) -> Result<bool, ServiceError>;

    /// Insert when `id` is `None`, otherwise update the stored row. Returns the stored record.
    async fn save(&self, reservation: Reservation) -> Result<Reservation, ServiceError>;
    /// Returns true if a row was removed.
    async fn delete_by_id(&self, id: i32) -> Result<bool, ServiceError>;
}

/// Lookup of users by surrogate id.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, ServiceError>;
}

/// Lookup of vehicles by surrogate id.
#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn find_vehicle_by_id(&self, id: i32) -> Result<Option<Vehicle>, ServiceError>;
}

/// Simple in-memory store for tests, benches and doc examples
pub mod memory {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    #[derive(Default)]
    struct State {
        reservations: BTreeMap<i32, Reservation>, // key: surrogate id
        users: HashMap<i32, User>,
        vehicles: HashMap<i32, Vehicle>,
        last_reservation_id: i32,
    }

    /// Implements all three store traits over one mutex-guarded state.
    #[derive(Default)]
    pub struct InMemoryStore {
        state: Mutex<State>,
    }

    impl InMemoryStore {
        pub fn new() -> Self { Self::default() }

        fn state(&self) -> MutexGuard<'_, State> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        pub fn add_user(&self, name: &str, email: &str) -> User {
            let mut state = self.state();
            let user = User { id: state.users.len() as i32 + 1, name: name.to_string(), email: email.to_string() };
            state.users.insert(user.id, user.clone());
            user
        }

        pub fn add_vehicle(&self, license_plate: &str, model: &str) -> Vehicle {
            let mut state = self.state();
            let vehicle = Vehicle { id: state.vehicles.len() as i32 + 1, license_plate: license_plate.to_string(), model: model.to_string() };
            state.vehicles.insert(vehicle.id, vehicle.clone());
            vehicle
        }

        pub fn reservation_count(&self) -> usize { self.state().reservations.len() }

        fn select(&self, pred: impl Fn(&Reservation) -> bool) -> Vec<Reservation> {
            self.state().reservations.values().filter(|r| pred(r)).cloned().collect()
        }
    }

    #[async_trait]
    impl ReservationStore for InMemoryStore {
        async fn find_by_id(&self, id: i32) -> Result<Option<Reservation>, ServiceError> {
            Ok(self.state().reservations.get(&id).cloned())
        }

        async fn find_by_reservation_id(&self, reservation_id: &str) -> Result<Option<Reservation>, ServiceError> {
            Ok(self.select(|r| r.reservation_id == reservation_id).into_iter().next())
        }

        async fn find_by_user(&self, user_id: i32) -> Result<Vec<Reservation>, ServiceError> {
            Ok(self.select(|r| r.user.id == user_id))
        }

        async fn find_by_vehicle(&self, vehicle_id: i32) -> Result<Vec<Reservation>, ServiceError> {
            Ok(self.select(|r| r.vehicle.id == vehicle_id))
        }

        async fn find_by_status(&self, status: ReservationStatus) -> Result<Vec<Reservation>, ServiceError> {
            Ok(self.select(|r| r.status == status))
        }

        async fn find_by_start_time_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<Reservation>, ServiceError> {
            Ok(self.select(|r| r.starts_within(start, end)))
        }

        async fn find_all(&self) -> Result<Vec<Reservation>, ServiceError> {
            Ok(self.select(|_| true))
        }

        async fn find_page(&self, page: Pagination) -> Result<Vec<Reservation>, ServiceError> {
            let (_, per_page) = page.normalize();
            let state = self.state();
            Ok(state
                .reservations
                .values()
                .skip(page.offset() as usize)
                .take(per_page as usize)
                .cloned()
                .collect())
        }

        async fn exists_by_id(&self, id: i32) -> Result<bool, ServiceError> {
            Ok(self.state().reservations.contains_key(&id))
        }

        async fn exists_by_reservation_id(&self, reservation_id: &str) -> Result<bool, ServiceError> {
            Ok(self.state().reservations.values().any(|r| r.reservation_id == reservation_id))
        }

        async fn save(&self, mut reservation: Reservation) -> Result<Reservation, ServiceError> {
            let mut state = self.state();
            let clash = state
                .reservations
                .values()
                .any(|r| r.reservation_id == reservation.reservation_id && r.id != reservation.id);
            if clash {
                return Err(ServiceError::already_exists("reservation", &reservation.reservation_id));
            }
            let id = match reservation.id {
                Some(id) if state.reservations.contains_key(&id) => id,
                Some(id) => return Err(ServiceError::not_found("reservation", id)),
                None => {
                    state.last_reservation_id += 1;
                    state.last_reservation_id
                }
            };
            reservation.id = Some(id);
            state.reservations.insert(id, reservation.clone());
            Ok(reservation)
        }

        async fn delete_by_id(&self, id: i32) -> Result<bool, ServiceError> {
            Ok(self.state().reservations.remove(&id).is_some())
        }
    }

    #[async_trait]
    impl UserStore for InMemoryStore {
        async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, ServiceError> {
            Ok(self.state().users.get(&id).cloned())
        }
    }

    #[async_trait]
    impl VehicleStore for InMemoryStore {
        async fn find_vehicle_by_id(&self, id: i32) -> Result<Option<Vehicle>, ServiceError> {
            Ok(self.state().vehicles.get(&id).cloned())
        }
    }
}
