use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use models::ReservationStatus;

/// Read-only view of a user owned by another system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// Read-only view of a vehicle owned by another system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i32,
    pub license_plate: String,
    pub model: String,
}

/// Create input. User and vehicle are referenced by id and resolved on create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReservation {
    pub reservation_id: String,
    pub user_id: i32,
    pub vehicle_id: i32,
    pub spot_id: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: ReservationStatus,
}

/// The fields an existing reservation may change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationUpdate {
    pub spot_id: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: ReservationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Store-assigned; `None` until the first save.
    pub id: Option<i32>,
    pub reservation_id: String,
    pub user: User,
    pub vehicle: Vehicle,
    pub spot_id: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: ReservationStatus,
}

impl Reservation {
    /// Attach resolved user and vehicle to a create request.
    pub fn from_new(new: NewReservation, user: User, vehicle: Vehicle) -> Self {
        Self {
            id: None,
            reservation_id: new.reservation_id,
            user,
            vehicle,
            spot_id: new.spot_id,
            start_time: new.start_time,
            end_time: new.end_time,
            status: new.status,
        }
    }

    /// Overwrite the mutable fields; identifier, user and vehicle stay as they are.
    pub fn apply(&mut self, update: ReservationUpdate) {
        self.spot_id = update.spot_id;
        self.start_time = update.start_time;
        self.end_time = update.end_time;
        self.status = update.status;
    }

    pub fn starts_within(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start <= self.start_time && self.start_time <= end
    }
}

impl From<models::user::Model> for User {
    fn from(m: models::user::Model) -> Self {
        Self { id: m.id, name: m.name, email: m.email }
    }
}

impl From<models::vehicle::Model> for Vehicle {
    fn from(m: models::vehicle::Model) -> Self {
        Self { id: m.id, license_plate: m.license_plate, model: m.model }
    }
}
