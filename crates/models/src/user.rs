use sea_orm::{entity::prelude::*, ConnectionTrait, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::reservation;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Reservation,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Reservation => Entity::has_many(reservation::Entity).into() }
    }
}

impl Related<reservation::Entity> for Entity {
    fn to() -> RelationDef { Relation::Reservation.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::Validation("name required".into())); }
    Ok(())
}

/// Users are owned elsewhere; this exists for seeding and tests.
pub async fn create<C: ConnectionTrait>(db: &C, name: &str, email: &str) -> Result<Model, errors::ModelError> {
    if !email.contains('@') { return Err(errors::ModelError::Validation("invalid email".into())); }
    validate_name(name)?;
    let am = ActiveModel {
        id: NotSet,
        name: Set(name.trim().to_string()),
        email: Set(email.to_string()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
