use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder};
use tracing::{info, instrument};
use uuid::Uuid;

use models::{message, report, user};

use crate::{errors::ServiceError, pagination::Pagination};

/// File a report against a forum message.
///
/// The referenced message and its author must both exist, and a reporter
/// may report a given message only once.
#[instrument(skip(db, reason), fields(message_id = %message_id, reporter_id = %reporter_id))]
pub async fn create_report(
    db: &DatabaseConnection,
    message_id: Uuid,
    reporter_id: Uuid,
    reason: &str,
) -> Result<report::Model, ServiceError> {
    let the_message = message::Entity::find_by_id(message_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("message"))?;

    let author = user::Entity::find_by_id(the_message.author_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if author.is_none() {
        return Err(ServiceError::not_found("message author"));
    }

    if report::find_by_reporter_and_message(db, reporter_id, message_id).await?.is_some() {
        return Err(ServiceError::Conflict("message already reported by this user".into()));
    }

    let created = report::create(db, message_id, reporter_id, reason).await?;
    info!(report_id = %created.id, "report_created");
    Ok(created)
}

/// All reports, newest first.
pub async fn list_reports(db: &DatabaseConnection, opts: Pagination) -> Result<Vec<report::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    report::Entity::find()
        .order_by_desc(report::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Every report filed against one message. Intentionally does not check
/// that the message still exists: reports outlive deleted messages.
pub async fn list_reports_for_message(
    db: &DatabaseConnection,
    message_id: Uuid,
) -> Result<Vec<report::Model>, ServiceError> {
    Ok(report::list_by_message(db, message_id).await?)
}
