use axum::{Json, extract::State};
use std::sync::Arc;

use super::validation::ApiJson;
use super::{ApiError, ApiResponse, AppState};
use crate::models::settings::SiteSettings;
use crate::services::SettingsError;

impl From<SettingsError> for ApiError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::Validation(msg) => Self::validation(msg),
            SettingsError::Database(msg) => Self::DatabaseError(msg),
            SettingsError::Internal(msg) => Self::internal(msg),
        }
    }
}

pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SiteSettings>>, ApiError> {
    let settings = state.settings_service().get().await?;
    Ok(Json(ApiResponse::success(settings)))
}

/// PUT /admin/settings
/// The whole document is validated and replaced.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    ApiJson(settings): ApiJson<SiteSettings>,
) -> Result<Json<ApiResponse<SiteSettings>>, ApiError> {
    let settings = state.settings_service().update(settings).await?;
    Ok(Json(ApiResponse::success(settings)))
}
