pub mod seaorm;

pub use seaorm::{SeaOrmReservationService, SeaOrmReservations, SeaOrmStore};
