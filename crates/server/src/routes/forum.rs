use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use models::{message, topic};
use service::auth::domain::Claims;
use service::forum_service;
use service::pagination::Pagination;

use crate::errors::{from_service_error, JsonApiError};
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize)]
pub struct ListTopicsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTopicInput {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct PostMessageInput {
    pub body: String,
}

#[utoipa::path(get, path = "/api/forum/topics", tag = "forum", responses((status = 200, description = "Topics")))]
pub async fn list_topics(
    State(state): State<ServerState>,
    Query(q): Query<ListTopicsQuery>,
) -> Result<Json<Vec<topic::Model>>, JsonApiError> {
    let opts = Pagination {
        page: q.page.unwrap_or(1),
        limit: q.limit.unwrap_or(20),
    };
    let topics = forum_service::list_topics(&state.db, opts)
        .await
        .map_err(from_service_error)?;
    Ok(Json(topics))
}

#[utoipa::path(post, path = "/api/forum/topics", tag = "forum", request_body = crate::openapi::CreateTopicInputDoc, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request")))]
pub async fn create_topic(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<CreateTopicInput>,
) -> Result<(StatusCode, Json<topic::Model>), JsonApiError> {
    let created = forum_service::create_topic(&state.db, claims.uid, &input.title)
        .await
        .map_err(from_service_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/forum/topics/{id}", tag = "forum", params(("id" = Uuid, Path,)), responses((status = 200, description = "Topic"), (status = 404, description = "Not Found")))]
pub async fn get_topic(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<topic::Model>, JsonApiError> {
    let found = forum_service::get_topic(&state.db, id)
        .await
        .map_err(from_service_error)?
        .ok_or_else(|| JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some("topic not found".into())))?;
    Ok(Json(found))
}

#[utoipa::path(get, path = "/api/forum/topics/{id}/messages", tag = "forum", params(("id" = Uuid, Path,)), responses((status = 200, description = "Messages"), (status = 404, description = "Not Found")))]
pub async fn list_messages(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<message::Model>>, JsonApiError> {
    let messages = forum_service::list_messages(&state.db, id)
        .await
        .map_err(from_service_error)?;
    Ok(Json(messages))
}

#[utoipa::path(post, path = "/api/forum/topics/{id}/messages", tag = "forum", params(("id" = Uuid, Path,)), request_body = crate::openapi::PostMessageInputDoc, responses((status = 201, description = "Created"), (status = 404, description = "Not Found")))]
pub async fn post_message(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(input): Json<PostMessageInput>,
) -> Result<(StatusCode, Json<message::Model>), JsonApiError> {
    let created = forum_service::post_message(&state.db, id, claims.uid, &input.body)
        .await
        .map_err(from_service_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}
