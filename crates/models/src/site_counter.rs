use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site_counter")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: i64,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match *self {}
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_key(key: &str) -> Result<(), errors::ModelError> {
    if key.trim().is_empty() || key.len() > 64 {
        return Err(errors::ModelError::Validation("invalid counter key".into()));
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(errors::ModelError::Validation("counter key must be alphanumeric".into()));
    }
    Ok(())
}

/// Read-modify-write increment; counters are advisory, so no row lock.
pub async fn increment(db: &DatabaseConnection, key: &str) -> Result<Model, errors::ModelError> {
    validate_key(key)?;
    let now = Utc::now().into();
    let existing = Entity::find_by_id(key)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    match existing {
        Some(m) => {
            let next = m.value + 1;
            let mut am: ActiveModel = m.into();
            am.value = Set(next);
            am.updated_at = Set(now);
            am.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
        }
        None => {
            let am = ActiveModel {
                key: Set(key.to_string()),
                value: Set(1),
                updated_at: Set(now),
            };
            am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
        }
    }
}

pub async fn all(db: &DatabaseConnection) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find().all(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_charset() {
        assert!(validate_key("visits_home").is_ok());
        assert!(validate_key("bad key").is_err());
        assert!(validate_key("").is_err());
    }
}
