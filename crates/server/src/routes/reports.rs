use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use models::{report, user};
use service::auth::domain::Claims;
use service::pagination::Pagination;
use service::report_service;

use crate::errors::{from_service_error, JsonApiError};
use crate::routes::auth::{require_role, ServerState};

#[derive(Debug, Deserialize)]
pub struct ListReportsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReportInput {
    pub message_id: String,
    pub reason: String,
}

/// `message_id` arrives as a string so a malformed id is a plain 400
/// instead of a body-deserialization rejection.
#[utoipa::path(post, path = "/api/reports", tag = "reports", request_body = crate::openapi::CreateReportInputDoc, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found"), (status = 409, description = "Conflict")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<CreateReportInput>,
) -> Result<(StatusCode, Json<report::Model>), JsonApiError> {
    let message_id = Uuid::parse_str(&input.message_id).map_err(|_| {
        JsonApiError::new(
            StatusCode::BAD_REQUEST,
            "Validation Error",
            Some("malformed message id".into()),
        )
    })?;
    let created = report_service::create_report(&state.db, message_id, claims.uid, &input.reason)
        .await
        .map_err(from_service_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/reports", tag = "reports", responses((status = 200, description = "Reports"), (status = 403, description = "Forbidden")))]
pub async fn list(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<ListReportsQuery>,
) -> Result<Json<Vec<report::Model>>, JsonApiError> {
    require_role(&claims, user::ROLE_ADMIN)?;
    let opts = Pagination {
        page: q.page.unwrap_or(1),
        limit: q.limit.unwrap_or(20),
    };
    let reports = report_service::list_reports(&state.db, opts)
        .await
        .map_err(from_service_error)?;
    Ok(Json(reports))
}

#[utoipa::path(get, path = "/api/reports/message/{message_id}", tag = "reports", params(("message_id" = Uuid, Path,)), responses((status = 200, description = "Reports"), (status = 403, description = "Forbidden")))]
pub async fn list_for_message(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(message_id): Path<Uuid>,
) -> Result<Json<Vec<report::Model>>, JsonApiError> {
    require_role(&claims, user::ROLE_ADMIN)?;
    let reports = report_service::list_reports_for_message(&state.db, message_id)
        .await
        .map_err(from_service_error)?;
    Ok(Json(reports))
}
