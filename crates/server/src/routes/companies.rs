use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use models::{company_profile, user};
use service::auth::domain::Claims;
use service::company_service::{self, CompanyProfileInput};
use service::pagination::Pagination;

use crate::errors::{from_service_error, JsonApiError};
use crate::routes::auth::{require_role, ServerState};

#[derive(Debug, Deserialize)]
pub struct ListCompaniesQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CompanyProfileBody {
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub city: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CompanyProfileBody {
    fn as_input(&self) -> CompanyProfileInput<'_> {
        CompanyProfileInput {
            name: &self.name,
            description: &self.description,
            website: self.website.as_deref(),
            city: &self.city,
            address: self.address.as_deref(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[utoipa::path(get, path = "/api/companies", tag = "companies", responses((status = 200, description = "Company profiles")))]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListCompaniesQuery>,
) -> Result<Json<Vec<company_profile::Model>>, JsonApiError> {
    let opts = Pagination {
        page: q.page.unwrap_or(1),
        limit: q.limit.unwrap_or(20),
    };
    let profiles = company_service::list_profiles(&state.db, opts)
        .await
        .map_err(from_service_error)?;
    Ok(Json(profiles))
}

#[utoipa::path(post, path = "/api/companies", tag = "companies", request_body = crate::openapi::CompanyProfileInputDoc, responses((status = 201, description = "Created"), (status = 403, description = "Forbidden"), (status = 409, description = "Conflict")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CompanyProfileBody>,
) -> Result<(StatusCode, Json<company_profile::Model>), JsonApiError> {
    require_role(&claims, user::ROLE_COMPANY)?;
    let created = company_service::create_profile(&state.db, claims.uid, body.as_input())
        .await
        .map_err(from_service_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/companies/{id}", tag = "companies", params(("id" = Uuid, Path,)), responses((status = 200, description = "Company profile"), (status = 404, description = "Not Found")))]
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<company_profile::Model>, JsonApiError> {
    let found = company_service::get_profile(&state.db, id)
        .await
        .map_err(from_service_error)?
        .ok_or_else(|| {
            JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some("company profile not found".into()))
        })?;
    Ok(Json(found))
}

#[utoipa::path(put, path = "/api/companies/{id}", tag = "companies", params(("id" = Uuid, Path,)), request_body = crate::openapi::CompanyProfileInputDoc, responses((status = 200, description = "Updated"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(body): Json<CompanyProfileBody>,
) -> Result<Json<company_profile::Model>, JsonApiError> {
    require_role(&claims, user::ROLE_COMPANY)?;
    let updated = company_service::update_profile(&state.db, id, claims.uid, body.as_input())
        .await
        .map_err(from_service_error)?;
    Ok(Json(updated))
}
