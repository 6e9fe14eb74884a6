use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::ApiJson;
use super::{ApiError, ApiResponse, AppState, SignatureRequest, UploadResponse};
use crate::services::{SignedUpload, UploadError};

/// Multipart framing allowance on top of the file itself.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::UnsupportedType(_) | UploadError::Validation(_) => {
                Self::validation(err.to_string())
            }
            UploadError::TooLarge { .. } => Self::PayloadTooLarge(err.to_string()),
            UploadError::Storage(msg) => Self::internal(format!("Upload storage failed: {msg}")),
            UploadError::Upstream(message) => Self::ExternalApiError {
                service: "Image CDN".to_string(),
                message,
            },
        }
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::validation(err.body_text())
    }
}

/// POST /admin/uploads
/// Expects the image in the multipart field `file`.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadResponse>>), ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        let url = state
            .upload_service()
            .store(&file_name, content_type.as_deref(), bytes.to_vec())
            .await?;

        return Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(UploadResponse { url })),
        ));
    }

    Err(ApiError::validation("multipart field 'file' is required"))
}

/// POST /admin/uploads/signature
pub async fn signature(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<SignatureRequest>,
) -> Result<Json<ApiResponse<SignedUpload>>, ApiError> {
    let signed = state.upload_service().sign(payload.folder.as_deref())?;
    Ok(Json(ApiResponse::success(signed)))
}
