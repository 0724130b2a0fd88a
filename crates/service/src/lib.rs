//! Service layer for vehicle reservations on top of `models`.
//! - Separates business rules from data access through store traits.
//! - Reuses validation and entity definitions in `models` crate.
//! - Ships an in-memory store and a SeaORM store with transactional writes.

pub mod errors;
pub mod db;
pub mod reservation;
#[cfg(test)]
pub mod test_support;
