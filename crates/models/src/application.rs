use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors, post, user};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACCEPTED: &str = "accepted";
pub const STATUS_REJECTED: &str = "rejected";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "application")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_id: Uuid,
    pub student_id: Uuid,
    pub cover_letter: String,
    pub cv_key: Option<String>,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Post,
    Student,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Post => Entity::belongs_to(post::Entity)
                .from(Column::PostId)
                .to(post::Column::Id)
                .into(),
            Relation::Student => Entity::belongs_to(user::Entity)
                .from(Column::StudentId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_status(status: &str) -> Result<(), errors::ModelError> {
    match status {
        STATUS_PENDING | STATUS_ACCEPTED | STATUS_REJECTED => Ok(()),
        _ => Err(errors::ModelError::Validation("invalid application status".into())),
    }
}

pub fn validate_cover_letter(text: &str) -> Result<(), errors::ModelError> {
    if text.trim().is_empty() {
        return Err(errors::ModelError::Validation("cover letter required".into()));
    }
    if text.len() > 10_000 {
        return Err(errors::ModelError::Validation("cover letter too long (<=10000)".into()));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    post_id: Uuid,
    student_id: Uuid,
    cover_letter: &str,
    cv_key: Option<&str>,
) -> Result<Model, errors::ModelError> {
    validate_cover_letter(cover_letter)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        post_id: Set(post_id),
        student_id: Set(student_id),
        cover_letter: Set(cover_letter.to_string()),
        cv_key: Set(cv_key.map(str::to_string)),
        status: Set(STATUS_PENDING.into()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_post_and_student(
    db: &DatabaseConnection,
    post_id: Uuid,
    student_id: Uuid,
) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::PostId.eq(post_id))
        .filter(Column::StudentId.eq(student_id))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
