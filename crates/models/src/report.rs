use sea_orm::{entity::prelude::*, DatabaseConnection, QueryOrder, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub message_id: Uuid,
    pub reporter_id: Uuid,
    pub reason: String,
    pub created_at: DateTimeWithTimeZone,
}

// No relation to message: a report outlives the message it names.
#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Reporter,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Reporter => Entity::belongs_to(user::Entity)
                .from(Column::ReporterId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_reason(reason: &str) -> Result<(), errors::ModelError> {
    if reason.trim().is_empty() {
        return Err(errors::ModelError::Validation("reason required".into()));
    }
    if reason.len() > 512 {
        return Err(errors::ModelError::Validation("reason too long (<=512)".into()));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    message_id: Uuid,
    reporter_id: Uuid,
    reason: &str,
) -> Result<Model, errors::ModelError> {
    validate_reason(reason)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        message_id: Set(message_id),
        reporter_id: Set(reporter_id),
        reason: Set(reason.to_string()),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_reporter_and_message(
    db: &DatabaseConnection,
    reporter_id: Uuid,
    message_id: Uuid,
) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::ReporterId.eq(reporter_id))
        .filter(Column::MessageId.eq(message_id))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn list_by_message(db: &DatabaseConnection, message_id: Uuid) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::MessageId.eq(message_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
