//! Reservation module: three-layer architecture (domain, repository, service).
//!
//! `repository` declares the store seams and an in-memory store; `repo::seaorm`
//! backs them with the relational schema from the `migration` crate.

pub mod domain;
pub mod repository;
pub mod service;
pub mod repo;

pub use domain::{NewReservation, Reservation, ReservationStatus, ReservationUpdate, User, Vehicle};
pub use service::ReservationService;
