use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};

use service::auth::domain::Claims;
use service::uploads::{self, UploadError};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize)]
pub struct PresignUploadInput {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
}

#[derive(Debug, Serialize)]
pub struct PresignUploadOutput {
    pub url: String,
    pub key: String,
    pub expires_in_secs: u64,
}

fn upload_error_response(e: UploadError) -> JsonApiError {
    match e {
        UploadError::UnsupportedType | UploadError::TooLarge | UploadError::InvalidName(_) => {
            JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(e.to_string()))
        }
        UploadError::NotConfigured => {
            JsonApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable", Some(e.to_string()))
        }
    }
}

/// Validate the declared upload and hand back a time-limited PUT URL.
/// File bytes go straight to the bucket, never through this server.
#[utoipa::path(post, path = "/api/uploads/presign", tag = "uploads", request_body = crate::openapi::PresignUploadInputDoc, responses((status = 200, description = "Presigned"), (status = 400, description = "Bad Request"), (status = 503, description = "Storage Unavailable")))]
pub async fn presign(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<PresignUploadInput>,
) -> Result<Json<PresignUploadOutput>, JsonApiError> {
    uploads::validate_upload(&input.content_type, input.size_bytes, state.presigner.max_upload_bytes())
        .map_err(upload_error_response)?;
    let key = uploads::object_key(claims.uid, &input.file_name).map_err(upload_error_response)?;
    let presigned = state
        .presigner
        .presign_put(&key, chrono::Utc::now())
        .map_err(upload_error_response)?;
    Ok(Json(PresignUploadOutput {
        url: presigned.url,
        key: presigned.key,
        expires_in_secs: presigned.expires_in_secs,
    }))
}
