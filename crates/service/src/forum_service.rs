use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use tracing::{info, instrument};
use uuid::Uuid;

use models::{message, topic};

use crate::{errors::ServiceError, pagination::Pagination};

#[instrument(skip(db), fields(author_id = %author_id, title = %title))]
pub async fn create_topic(db: &DatabaseConnection, author_id: Uuid, title: &str) -> Result<topic::Model, ServiceError> {
    let created = topic::create(db, author_id, title).await?;
    info!(topic_id = %created.id, "topic_created");
    Ok(created)
}

pub async fn get_topic(db: &DatabaseConnection, id: Uuid) -> Result<Option<topic::Model>, ServiceError> {
    topic::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Threads, newest first.
pub async fn list_topics(db: &DatabaseConnection, opts: Pagination) -> Result<Vec<topic::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    topic::Entity::find()
        .order_by_desc(topic::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Post into an existing topic.
#[instrument(skip(db, body), fields(topic_id = %topic_id, author_id = %author_id))]
pub async fn post_message(
    db: &DatabaseConnection,
    topic_id: Uuid,
    author_id: Uuid,
    body: &str,
) -> Result<message::Model, ServiceError> {
    let exists = topic::Entity::find_by_id(topic_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if exists.is_none() {
        return Err(ServiceError::not_found("topic"));
    }
    let created = message::create(db, topic_id, author_id, body).await?;
    info!(message_id = %created.id, "message_posted");
    Ok(created)
}

/// Messages of one topic in reading order (oldest first).
pub async fn list_messages(db: &DatabaseConnection, topic_id: Uuid) -> Result<Vec<message::Model>, ServiceError> {
    if get_topic(db, topic_id).await?.is_none() {
        return Err(ServiceError::not_found("topic"));
    }
    message::Entity::find()
        .filter(message::Column::TopicId.eq(topic_id))
        .order_by_asc(message::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}
