use std::fmt::Display;

use models::errors::ModelError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: impl Display) -> Self {
        Self::NotFound(format!("{entity} not found with id: {id}"))
    }

    pub fn already_exists(entity: &str, id: impl Display) -> Self {
        Self::AlreadyExists(format!("{entity} with id {id} already exists"))
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 1001,
            ServiceError::AlreadyExists(_) => 1002,
            ServiceError::NotFound(_) => 1003,
            ServiceError::Db(_) => 1200,
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => Self::Validation(msg),
            ModelError::Db(msg) => Self::Db(msg),
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self { Self::Db(e.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_keep_their_kind() {
        let v: ServiceError = ModelError::Validation("bad".into()).into();
        assert!(matches!(v, ServiceError::Validation(ref m) if m == "bad"));
        let d: ServiceError = ModelError::Db("down".into()).into();
        assert!(matches!(d, ServiceError::Db(_)));
    }

    #[test]
    fn messages_and_codes() {
        let e = ServiceError::not_found("reservation", 42);
        assert_eq!(e.to_string(), "not found: reservation not found with id: 42");
        assert_eq!(e.code(), 1003);
        let e = ServiceError::already_exists("reservation", "R-1");
        assert_eq!(e.to_string(), "already exists: reservation with id R-1 already exists");
        assert_eq!(e.code(), 1002);
    }
}
