//! Shared helpers used across the reservation workspace.

pub mod pagination;
pub mod utils;
