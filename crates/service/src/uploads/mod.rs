//! Upload validation and presigned-URL issuance.

pub mod presign;

use thiserror::Error;
use uuid::Uuid;

/// MIME types accepted for CV/attachment uploads.
pub const ALLOWED_MIME_TYPES: &[&str] = &["application/pdf", "image/png", "image/jpeg"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported file type")]
    UnsupportedType,
    #[error("file too large")]
    TooLarge,
    #[error("storage not configured")]
    NotConfigured,
    #[error("invalid file name: {0}")]
    InvalidName(String),
}

/// Accept a file only if its declared MIME type is in the fixed allow-list
/// and its declared size fits the configured ceiling.
pub fn validate_upload(content_type: &str, size_bytes: u64, max_bytes: u64) -> Result<(), UploadError> {
    if !ALLOWED_MIME_TYPES.contains(&content_type) {
        return Err(UploadError::UnsupportedType);
    }
    if size_bytes == 0 || size_bytes > max_bytes {
        return Err(UploadError::TooLarge);
    }
    Ok(())
}

/// Build an object key scoped to the uploading user.
/// Keeps the extension from the declared file name, nothing else.
pub fn object_key(user_id: Uuid, file_name: &str) -> Result<String, UploadError> {
    let trimmed = file_name.trim();
    if trimmed.is_empty() || trimmed.contains("..") || trimmed.contains('/') {
        return Err(UploadError::InvalidName(file_name.into()));
    }
    let ext = trimmed.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
    let id = Uuid::new_v4();
    Ok(match ext {
        Some(ext) if !ext.is_empty() => format!("uploads/{user_id}/{id}.{ext}"),
        _ => format!("uploads/{user_id}/{id}"),
    })
}
