use sea_orm::{entity::prelude::*, ConnectionTrait, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::reservation;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicle")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub license_plate: String,
    pub model: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Reservation }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Reservation => Entity::has_many(reservation::Entity).into() }
    }
}

impl Related<reservation::Entity> for Entity {
    fn to() -> RelationDef { Relation::Reservation.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Plates are stored trimmed and upper-cased.
pub fn normalize_plate(plate: &str) -> Result<String, errors::ModelError> {
    let p = plate.trim().to_ascii_uppercase();
    if p.is_empty() || p.len() > 32 {
        return Err(errors::ModelError::Validation("license_plate must be 1..=32 chars".into()));
    }
    Ok(p)
}

pub async fn create<C: ConnectionTrait>(db: &C, license_plate: &str, model: &str) -> Result<Model, errors::ModelError> {
    let license_plate = normalize_plate(license_plate)?;
    let am = ActiveModel {
        id: NotSet,
        license_plate: Set(license_plate),
        model: Set(model.trim().to_string()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plates_are_normalized() {
        assert_eq!(normalize_plate("  ab-123-cd ").unwrap(), "AB-123-CD");
        assert!(normalize_plate("   ").is_err());
        assert!(normalize_plate(&"X".repeat(33)).is_err());
    }
}
