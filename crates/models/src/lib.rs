//! SeaORM entities for the reservation store plus model-level validation.

pub mod errors;
pub mod db;
pub mod user;
pub mod vehicle;
pub mod reservation;

pub use reservation::ReservationStatus;

#[cfg(test)]
mod tests;
