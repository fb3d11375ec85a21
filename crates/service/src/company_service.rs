use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set};
use tracing::{info, instrument};
use uuid::Uuid;

use models::company_profile;

use crate::{errors::ServiceError, pagination::Pagination};

pub struct CompanyProfileInput<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub website: Option<&'a str>,
    pub city: &'a str,
    pub address: Option<&'a str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Create the company profile for a user. One profile per user.
#[instrument(skip(db, input), fields(user_id = %user_id))]
pub async fn create_profile(
    db: &DatabaseConnection,
    user_id: Uuid,
    input: CompanyProfileInput<'_>,
) -> Result<company_profile::Model, ServiceError> {
    if company_profile::find_by_user(db, user_id).await?.is_some() {
        return Err(ServiceError::Conflict("company profile already exists".into()));
    }
    let created = company_profile::create(
        db,
        user_id,
        input.name,
        input.description,
        input.website,
        input.city,
        input.address,
        input.latitude,
        input.longitude,
    )
    .await?;
    info!(company_id = %created.id, "company_profile_created");
    Ok(created)
}

pub async fn get_profile(db: &DatabaseConnection, id: Uuid) -> Result<Option<company_profile::Model>, ServiceError> {
    company_profile::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

pub async fn get_profile_by_user(db: &DatabaseConnection, user_id: Uuid) -> Result<Option<company_profile::Model>, ServiceError> {
    Ok(company_profile::find_by_user(db, user_id).await?)
}

/// Update a profile; only its owner may.
#[instrument(skip(db, input), fields(company_id = %id, user_id = %user_id))]
pub async fn update_profile(
    db: &DatabaseConnection,
    id: Uuid,
    user_id: Uuid,
    input: CompanyProfileInput<'_>,
) -> Result<company_profile::Model, ServiceError> {
    let found = company_profile::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("company profile"))?;
    if found.user_id != user_id {
        return Err(ServiceError::Forbidden("not the profile owner".into()));
    }
    company_profile::validate_name(input.name)?;
    if let Some(url) = input.website {
        company_profile::validate_website(url)?;
    }
    company_profile::validate_coordinates(input.latitude, input.longitude)?;

    let mut am: company_profile::ActiveModel = found.into();
    am.name = Set(input.name.to_string());
    am.description = Set(input.description.to_string());
    am.website = Set(input.website.map(str::to_string));
    am.city = Set(input.city.to_string());
    am.address = Set(input.address.map(str::to_string));
    am.latitude = Set(input.latitude);
    am.longitude = Set(input.longitude);
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))
}

pub async fn list_profiles(
    db: &DatabaseConnection,
    opts: Pagination,
) -> Result<Vec<company_profile::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    company_profile::Entity::find()
        .order_by_desc(company_profile::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}
