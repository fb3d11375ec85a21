use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use models::{post, user};
use service::auth::domain::Claims;
use service::pagination::Pagination;
use service::post_service::{self, PostFilter};

use crate::errors::{from_service_error, JsonApiError};
use crate::routes::auth::{require_role, ServerState};

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub company: Option<Uuid>,
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostInput {
    pub title: String,
    pub description: String,
    pub field: String,
    pub city: String,
    #[serde(default)]
    pub paid: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub field: Option<String>,
    pub city: Option<String>,
    pub paid: Option<bool>,
    pub status: Option<String>,
}

#[utoipa::path(get, path = "/api/posts", tag = "posts", responses((status = 200, description = "Posts"), (status = 400, description = "Bad Request")))]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListPostsQuery>,
) -> Result<Json<Vec<post::Model>>, JsonApiError> {
    let filter = PostFilter { status: q.status, company: q.company, sort: q.sort };
    let opts = Pagination {
        page: q.page.unwrap_or(1),
        limit: q.limit.unwrap_or(20),
    };
    let posts = post_service::list_posts(&state.db, &filter, opts)
        .await
        .map_err(from_service_error)?;
    Ok(Json(posts))
}

#[utoipa::path(post, path = "/api/posts", tag = "posts", request_body = crate::openapi::CreatePostInputDoc, responses((status = 201, description = "Created"), (status = 403, description = "Forbidden")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<CreatePostInput>,
) -> Result<(StatusCode, Json<post::Model>), JsonApiError> {
    require_role(&claims, user::ROLE_COMPANY)?;
    let profile = service::company_service::get_profile_by_user(&state.db, claims.uid)
        .await
        .map_err(from_service_error)?
        .ok_or_else(|| {
            JsonApiError::new(
                StatusCode::BAD_REQUEST,
                "Validation Error",
                Some("create a company profile first".into()),
            )
        })?;
    let created = post_service::create_post(
        &state.db,
        profile.id,
        &input.title,
        &input.description,
        &input.field,
        &input.city,
        input.paid,
    )
    .await
    .map_err(from_service_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/posts/{id}", tag = "posts", params(("id" = Uuid, Path,)), responses((status = 200, description = "Post"), (status = 404, description = "Not Found")))]
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<post::Model>, JsonApiError> {
    let found = post_service::get_post(&state.db, id)
        .await
        .map_err(from_service_error)?
        .ok_or_else(|| JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some("post not found".into())))?;
    Ok(Json(found))
}

#[utoipa::path(put, path = "/api/posts/{id}", tag = "posts", params(("id" = Uuid, Path,)), request_body = crate::openapi::UpdatePostInputDoc, responses((status = 200, description = "Updated"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePostInput>,
) -> Result<Json<post::Model>, JsonApiError> {
    require_role(&claims, user::ROLE_COMPANY)?;
    require_post_owner(&state, id, claims.uid).await?;
    let updated = post_service::update_post(
        &state.db,
        id,
        input.title.as_deref(),
        input.description.as_deref(),
        input.field.as_deref(),
        input.city.as_deref(),
        input.paid,
        input.status.as_deref(),
    )
    .await
    .map_err(from_service_error)?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/api/posts/{id}", tag = "posts", params(("id" = Uuid, Path,)), responses((status = 204, description = "Deleted"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    require_role(&claims, user::ROLE_COMPANY)?;
    require_post_owner(&state, id, claims.uid).await?;
    let deleted = post_service::delete_post(&state.db, id)
        .await
        .map_err(from_service_error)?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some("post not found".into())))
    }
}

/// Posts may only be changed by the owner of their company profile.
async fn require_post_owner(state: &ServerState, post_id: Uuid, user_id: Uuid) -> Result<(), JsonApiError> {
    let found = post_service::get_post(&state.db, post_id)
        .await
        .map_err(from_service_error)?
        .ok_or_else(|| JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some("post not found".into())))?;
    let profile = service::company_service::get_profile(&state.db, found.company_id)
        .await
        .map_err(from_service_error)?
        .ok_or_else(|| {
            JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some("company profile not found".into()))
        })?;
    if profile.user_id != user_id {
        return Err(JsonApiError::new(
            StatusCode::FORBIDDEN,
            "Forbidden",
            Some("not the post owner".into()),
        ));
    }
    Ok(())
}
