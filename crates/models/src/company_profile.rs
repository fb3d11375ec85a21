use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "company_profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub city: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Owner,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Owner => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("company name required".into()));
    }
    if name.len() > 128 {
        return Err(errors::ModelError::Validation("company name too long (<=128)".into()));
    }
    Ok(())
}

pub fn validate_website(url: &str) -> Result<(), errors::ModelError> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(errors::ModelError::Validation("website must start with http(s)".into()));
    }
    Ok(())
}

pub fn validate_coordinates(lat: Option<f64>, lng: Option<f64>) -> Result<(), errors::ModelError> {
    match (lat, lng) {
        (None, None) => Ok(()),
        (Some(lat), Some(lng)) => {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                return Err(errors::ModelError::Validation("coordinates out of range".into()));
            }
            Ok(())
        }
        _ => Err(errors::ModelError::Validation("latitude and longitude must be set together".into())),
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn create(
    db: &DatabaseConnection,
    user_id: Uuid,
    name: &str,
    description: &str,
    website: Option<&str>,
    city: &str,
    address: Option<&str>,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Model, errors::ModelError> {
    validate_name(name)?;
    if let Some(url) = website {
        validate_website(url)?;
    }
    if city.trim().is_empty() {
        return Err(errors::ModelError::Validation("city required".into()));
    }
    validate_coordinates(latitude, longitude)?;

    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        website: Set(website.map(str::to_string)),
        city: Set(city.to_string()),
        address: Set(address.map(str::to_string)),
        latitude: Set(latitude),
        longitude: Set(longitude),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_user(db: &DatabaseConnection, user_id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn website_must_be_http() {
        assert!(validate_website("ftp://corp.example").is_err());
        assert!(validate_website("https://corp.example").is_ok());
    }

    #[test]
    fn coordinates_paired_and_in_range() {
        assert!(validate_coordinates(None, None).is_ok());
        assert!(validate_coordinates(Some(48.85), Some(2.35)).is_ok());
        assert!(validate_coordinates(Some(48.85), None).is_err());
        assert!(validate_coordinates(Some(95.0), Some(2.35)).is_err());
    }
}
