use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::{ApiJson, ApiPath, validate_id};
use super::{ApiError, ApiResponse, AppState, CreateUserRequest, SessionUserDto};
use crate::db::User;

pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<SessionUserDto>>>, ApiError> {
    let users = state.auth_service().list_users().await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(SessionUserDto::from).collect(),
    )))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(acting): Extension<User>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SessionUserDto>>), ApiError> {
    let user = state
        .auth_service()
        .add_user(&payload.email, payload.role.trim())
        .await?;

    tracing::info!(
        event = "admin_user_added",
        user_id = user.id,
        added_by = acting.id,
        "Added admin user"
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::success(user.into()))))
}

/// DELETE /admin/users/{id}
/// Admins cannot remove their own account.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(acting): Extension<User>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_id("user", id)?;
    state.auth_service().remove_user(id, acting.id).await?;
    Ok(Json(ApiResponse::success(())))
}
