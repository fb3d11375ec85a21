use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::{info, instrument};
use uuid::Uuid;

use models::post;

use crate::{errors::ServiceError, pagination::Pagination};

/// Sort order accepted by list endpoints; default is newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    pub fn parse(sort: Option<&str>) -> Result<Self, ServiceError> {
        match sort {
            None | Some("newest") => Ok(Self::NewestFirst),
            Some("oldest") => Ok(Self::OldestFirst),
            Some(other) => Err(ServiceError::Validation(format!("unknown sort '{other}'"))),
        }
    }
}

/// Optional query parameters for `GET /api/posts`.
#[derive(Debug, Default, Clone)]
pub struct PostFilter {
    pub status: Option<String>,
    pub company: Option<Uuid>,
    pub sort: Option<String>,
}

impl PostFilter {
    /// Map the optional params into a database condition and a sort order.
    /// Unknown status values fail before any query runs.
    pub fn build(&self) -> Result<(Condition, SortOrder), ServiceError> {
        let mut cond = Condition::all();
        if let Some(status) = &self.status {
            post::validate_status(status)?;
            cond = cond.add(post::Column::Status.eq(status.clone()));
        }
        if let Some(company) = self.company {
            cond = cond.add(post::Column::CompanyId.eq(company));
        }
        let order = SortOrder::parse(self.sort.as_deref())?;
        Ok((cond, order))
    }
}

#[instrument(skip(db, description), fields(company_id = %company_id, title = %title))]
pub async fn create_post(
    db: &DatabaseConnection,
    company_id: Uuid,
    title: &str,
    description: &str,
    field: &str,
    city: &str,
    paid: bool,
) -> Result<post::Model, ServiceError> {
    let created = post::create(db, company_id, title, description, field, city, paid).await?;
    info!(post_id = %created.id, "post_created");
    Ok(created)
}

pub async fn get_post(db: &DatabaseConnection, id: Uuid) -> Result<Option<post::Model>, ServiceError> {
    post::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Partial update; `status` transitions go through the same validator as
/// creation-time values.
#[instrument(skip(db, description), fields(post_id = %id))]
pub async fn update_post(
    db: &DatabaseConnection,
    id: Uuid,
    title: Option<&str>,
    description: Option<&str>,
    field: Option<&str>,
    city: Option<&str>,
    paid: Option<bool>,
    status: Option<&str>,
) -> Result<post::Model, ServiceError> {
    let found = post::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("post"))?;

    if let Some(t) = title {
        post::validate_title(t)?;
    }
    if let Some(s) = status {
        post::validate_status(s)?;
    }

    let mut am: post::ActiveModel = found.into();
    if let Some(t) = title { am.title = Set(t.to_string()); }
    if let Some(d) = description { am.description = Set(d.to_string()); }
    if let Some(f) = field { am.field = Set(f.to_string()); }
    if let Some(c) = city { am.city = Set(c.to_string()); }
    if let Some(p) = paid { am.paid = Set(p); }
    if let Some(s) = status { am.status = Set(s.to_string()); }
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))
}

pub async fn delete_post(db: &DatabaseConnection, id: Uuid) -> Result<bool, ServiceError> {
    let res = post::Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}

pub async fn list_posts(
    db: &DatabaseConnection,
    filter: &PostFilter,
    opts: Pagination,
) -> Result<Vec<post::Model>, ServiceError> {
    let (cond, order) = filter.build()?;
    let (page_idx, per_page) = opts.normalize();
    let query = post::Entity::find().filter(cond);
    let query = match order {
        SortOrder::NewestFirst => query.order_by_desc(post::Column::CreatedAt),
        SortOrder::OldestFirst => query.order_by_asc(post::Column::CreatedAt),
    };
    query
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}
