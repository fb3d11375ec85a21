use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{company_profile, errors};

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_PUBLISHED: &str = "published";
pub const STATUS_CLOSED: &str = "closed";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    pub field: String,
    pub city: String,
    pub paid: bool,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Company,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Company => Entity::belongs_to(company_profile::Entity)
                .from(Column::CompanyId)
                .to(company_profile::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_title(title: &str) -> Result<(), errors::ModelError> {
    if title.trim().is_empty() {
        return Err(errors::ModelError::Validation("title required".into()));
    }
    if title.len() > 160 {
        return Err(errors::ModelError::Validation("title too long (<=160)".into()));
    }
    Ok(())
}

pub fn validate_status(status: &str) -> Result<(), errors::ModelError> {
    match status {
        STATUS_DRAFT | STATUS_PUBLISHED | STATUS_CLOSED => Ok(()),
        _ => Err(errors::ModelError::Validation("invalid post status".into())),
    }
}

pub async fn create(
    db: &DatabaseConnection,
    company_id: Uuid,
    title: &str,
    description: &str,
    field: &str,
    city: &str,
    paid: bool,
) -> Result<Model, errors::ModelError> {
    validate_title(title)?;
    if field.trim().is_empty() {
        return Err(errors::ModelError::Validation("field required".into()));
    }
    if city.trim().is_empty() {
        return Err(errors::ModelError::Validation("city required".into()));
    }

    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        title: Set(title.to_string()),
        description: Set(description.to_string()),
        field: Set(field.to_string()),
        city: Set(city.to_string()),
        paid: Set(paid),
        status: Set(STATUS_DRAFT.into()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
