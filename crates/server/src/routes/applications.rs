use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use models::{application, user};
use service::application_service::{self, ApplicationFilter};
use service::auth::domain::Claims;
use service::pagination::Pagination;

use crate::errors::{from_service_error, JsonApiError};
use crate::routes::auth::{require_role, ServerState};

#[derive(Debug, Deserialize)]
pub struct ListApplicationsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub post: Option<Uuid>,
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateApplicationInput {
    pub post_id: Uuid,
    pub cover_letter: String,
    pub cv_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DecideApplicationInput {
    pub status: String,
}

#[utoipa::path(post, path = "/api/applications", tag = "applications", request_body = crate::openapi::CreateApplicationInputDoc, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found"), (status = 409, description = "Conflict")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<CreateApplicationInput>,
) -> Result<(StatusCode, Json<application::Model>), JsonApiError> {
    require_role(&claims, user::ROLE_STUDENT)?;
    let created = application_service::apply(
        &state.db,
        &state.mailer,
        input.post_id,
        claims.uid,
        &input.cover_letter,
        input.cv_key.as_deref(),
    )
    .await
    .map_err(from_service_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Listings are scoped to the caller: admins see everything, students only
/// their own applications, companies only applications to their own posts.
#[utoipa::path(get, path = "/api/applications", tag = "applications", responses((status = 200, description = "Applications"), (status = 400, description = "Bad Request")))]
pub async fn list(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<ListApplicationsQuery>,
) -> Result<Json<Vec<application::Model>>, JsonApiError> {
    let mut filter = ApplicationFilter {
        status: q.status,
        post: q.post,
        sort: q.sort,
        ..Default::default()
    };
    match claims.role.as_str() {
        user::ROLE_ADMIN => {}
        user::ROLE_COMPANY => {
            let Some(profile) = service::company_service::get_profile_by_user(&state.db, claims.uid)
                .await
                .map_err(from_service_error)?
            else {
                return Ok(Json(Vec::new()));
            };
            filter.company = Some(profile.id);
        }
        _ => filter.student = Some(claims.uid),
    }
    let opts = Pagination {
        page: q.page.unwrap_or(1),
        limit: q.limit.unwrap_or(20),
    };
    let applications = application_service::list_applications(&state.db, &filter, opts)
        .await
        .map_err(from_service_error)?;
    Ok(Json(applications))
}

#[utoipa::path(get, path = "/api/applications/{id}", tag = "applications", params(("id" = Uuid, Path,)), responses((status = 200, description = "Application"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn get(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<application::Model>, JsonApiError> {
    let found = application_service::get_application(&state.db, id)
        .await
        .map_err(from_service_error)?
        .ok_or_else(|| {
            JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some("application not found".into()))
        })?;
    require_party(&state, &found, &claims).await?;
    Ok(Json(found))
}

/// Only the applying student, the owner of the post's company, or an admin
/// may read an application.
async fn require_party(
    state: &ServerState,
    app: &application::Model,
    claims: &Claims,
) -> Result<(), JsonApiError> {
    if claims.role == user::ROLE_ADMIN || app.student_id == claims.uid {
        return Ok(());
    }
    let the_post = service::post_service::get_post(&state.db, app.post_id)
        .await
        .map_err(from_service_error)?;
    if let Some(p) = the_post {
        let profile = service::company_service::get_profile(&state.db, p.company_id)
            .await
            .map_err(from_service_error)?;
        if profile.map(|c| c.user_id) == Some(claims.uid) {
            return Ok(());
        }
    }
    Err(JsonApiError::new(
        StatusCode::FORBIDDEN,
        "Forbidden",
        Some("not a party to this application".into()),
    ))
}

#[utoipa::path(patch, path = "/api/applications/{id}/status", tag = "applications", params(("id" = Uuid, Path,)), request_body = crate::openapi::DecideApplicationInputDoc, responses((status = 200, description = "Decided"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found"), (status = 409, description = "Conflict")))]
pub async fn decide(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(input): Json<DecideApplicationInput>,
) -> Result<Json<application::Model>, JsonApiError> {
    require_role(&claims, user::ROLE_COMPANY)?;
    let updated = application_service::decide(&state.db, &state.mailer, id, claims.uid, &input.status)
        .await
        .map_err(from_service_error)?;
    Ok(Json(updated))
}
