use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::{application, company_profile, post, user};

use crate::errors::ServiceError;
use crate::mailer::{MailContent, MailMessage, Mailer};
use crate::pagination::Pagination;
use crate::post_service::SortOrder;

/// Optional query parameters for `GET /api/applications`, plus the caller
/// scope: `student` pins listings to the applying student, `company` to
/// applications against that company's posts.
#[derive(Debug, Default, Clone)]
pub struct ApplicationFilter {
    pub status: Option<String>,
    pub post: Option<Uuid>,
    pub student: Option<Uuid>,
    pub company: Option<Uuid>,
    pub sort: Option<String>,
}

impl ApplicationFilter {
    pub fn build(&self) -> Result<(Condition, SortOrder), ServiceError> {
        let mut cond = Condition::all();
        if let Some(status) = &self.status {
            application::validate_status(status)?;
            cond = cond.add(application::Column::Status.eq(status.clone()));
        }
        if let Some(post) = self.post {
            cond = cond.add(application::Column::PostId.eq(post));
        }
        if let Some(student) = self.student {
            cond = cond.add(application::Column::StudentId.eq(student));
        }
        let order = SortOrder::parse(self.sort.as_deref())?;
        Ok((cond, order))
    }
}

/// Submit an application: the post must exist and be published, and a
/// student applies to a given post at most once. The confirmation mail to
/// the company is best-effort.
#[instrument(skip(db, mailer, cover_letter), fields(post_id = %post_id, student_id = %student_id))]
pub async fn apply(
    db: &DatabaseConnection,
    mailer: &Mailer,
    post_id: Uuid,
    student_id: Uuid,
    cover_letter: &str,
    cv_key: Option<&str>,
) -> Result<application::Model, ServiceError> {
    let the_post = post::Entity::find_by_id(post_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("post"))?;
    if the_post.status != post::STATUS_PUBLISHED {
        return Err(ServiceError::Validation("post is not open for applications".into()));
    }
    if application::find_by_post_and_student(db, post_id, student_id).await?.is_some() {
        return Err(ServiceError::Conflict("application already submitted".into()));
    }

    let created = application::create(db, post_id, student_id, cover_letter, cv_key).await?;
    info!(application_id = %created.id, "application_created");

    // Notify the company owner; a mail failure never fails the request.
    match company_owner_email(db, the_post.company_id).await {
        Ok(Some(to)) => {
            let mail = MailMessage {
                to,
                subject: format!("New application for \"{}\"", the_post.title),
                content: MailContent::Template {
                    name: "application-received".into(),
                    context: serde_json::json!({
                        "post_title": the_post.title,
                        "application_id": created.id,
                    }),
                },
                from: None,
                reply_to: None,
            };
            if let Err(e) = mailer.send(mail).await {
                warn!(err = %e, application_id = %created.id, "application_mail_failed");
            }
        }
        Ok(None) => warn!(post_id = %post_id, "company owner has no address, skipping mail"),
        Err(e) => warn!(err = %e, "company owner lookup failed, skipping mail"),
    }

    Ok(created)
}

pub async fn get_application(db: &DatabaseConnection, id: Uuid) -> Result<Option<application::Model>, ServiceError> {
    application::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Accept or reject a pending application. Only the owner of the post's
/// company may decide; decided applications are final.
#[instrument(skip(db, mailer), fields(application_id = %id, actor = %actor_user_id, status = %new_status))]
pub async fn decide(
    db: &DatabaseConnection,
    mailer: &Mailer,
    id: Uuid,
    actor_user_id: Uuid,
    new_status: &str,
) -> Result<application::Model, ServiceError> {
    if new_status != application::STATUS_ACCEPTED && new_status != application::STATUS_REJECTED {
        return Err(ServiceError::Validation("status must be accepted or rejected".into()));
    }
    let found = application::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("application"))?;
    if found.status != application::STATUS_PENDING {
        return Err(ServiceError::Conflict("application already decided".into()));
    }

    let the_post = post::Entity::find_by_id(found.post_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("post"))?;
    let company = company_profile::Entity::find_by_id(the_post.company_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("company profile"))?;
    if company.user_id != actor_user_id {
        return Err(ServiceError::Forbidden("not the post owner".into()));
    }

    let student_id = found.student_id;
    let mut am: application::ActiveModel = found.into();
    am.status = Set(new_status.to_string());
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(application_id = %updated.id, status = %updated.status, "application_decided");

    match user_email(db, student_id).await {
        Ok(Some(to)) => {
            let mail = MailMessage {
                to,
                subject: format!("Your application for \"{}\"", the_post.title),
                content: MailContent::Template {
                    name: "application-decision".into(),
                    context: serde_json::json!({
                        "post_title": the_post.title,
                        "status": updated.status,
                    }),
                },
                from: None,
                reply_to: None,
            };
            if let Err(e) = mailer.send(mail).await {
                warn!(err = %e, application_id = %updated.id, "decision_mail_failed");
            }
        }
        Ok(None) => warn!(student_id = %student_id, "student not found, skipping mail"),
        Err(e) => warn!(err = %e, "student lookup failed, skipping mail"),
    }

    Ok(updated)
}

pub async fn list_applications(
    db: &DatabaseConnection,
    filter: &ApplicationFilter,
    opts: Pagination,
) -> Result<Vec<application::Model>, ServiceError> {
    let (mut cond, order) = filter.build()?;
    if let Some(company) = filter.company {
        let post_ids: Vec<Uuid> = post::Entity::find()
            .filter(post::Column::CompanyId.eq(company))
            .all(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?
            .into_iter()
            .map(|p| p.id)
            .collect();
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        cond = cond.add(application::Column::PostId.is_in(post_ids));
    }
    let (page_idx, per_page) = opts.normalize();
    let query = application::Entity::find().filter(cond);
    let query = match order {
        SortOrder::NewestFirst => query.order_by_desc(application::Column::CreatedAt),
        SortOrder::OldestFirst => query.order_by_asc(application::Column::CreatedAt),
    };
    query
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

async fn company_owner_email(db: &DatabaseConnection, company_id: Uuid) -> Result<Option<String>, ServiceError> {
    let Some(company) = company_profile::Entity::find_by_id(company_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
    else {
        return Ok(None);
    };
    user_email(db, company.user_id).await
}

async fn user_email(db: &DatabaseConnection, user_id: Uuid) -> Result<Option<String>, ServiceError> {
    let found = user::Entity::find_by_id(user_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(found.map(|u| u.email))
}
