use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors, topic, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub topic_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Topic,
    Author,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Topic => Entity::belongs_to(topic::Entity)
                .from(Column::TopicId)
                .to(topic::Column::Id)
                .into(),
            Relation::Author => Entity::belongs_to(user::Entity)
                .from(Column::AuthorId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_body(body: &str) -> Result<(), errors::ModelError> {
    if body.trim().is_empty() {
        return Err(errors::ModelError::Validation("message body required".into()));
    }
    if body.len() > 5_000 {
        return Err(errors::ModelError::Validation("message body too long (<=5000)".into()));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    topic_id: Uuid,
    author_id: Uuid,
    body: &str,
) -> Result<Model, errors::ModelError> {
    validate_body(body)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        topic_id: Set(topic_id),
        author_id: Set(author_id),
        body: Set(body.to_string()),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
