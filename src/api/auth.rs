use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tower_sessions::Session;

use super::validation::ApiJson;
use super::{ApiError, ApiResponse, AppState, LoginLinkRequest, MessageResponse, SessionUserDto};
use crate::db::User;
use crate::services::AuthError;

/// Session key holding the signed-in user's id.
pub const SESSION_USER_KEY: &str = "user_id";

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidLink => Self::Unauthorized(err.to_string()),
            AuthError::Unauthorized | AuthError::Forbidden => Self::unauthorized(),
            AuthError::UserNotFound => Self::NotFound(err.to_string()),
            AuthError::Conflict(msg) => Self::Conflict(msg),
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

pub async fn session_user_id(session: &Session) -> Option<i32> {
    match session.get::<i32>(SESSION_USER_KEY).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read session");
            None
        }
    }
}

/// Loads the session user and re-checks the stored role.
pub async fn current_admin(state: &AppState, session: &Session) -> Result<User, AuthError> {
    let user_id = session_user_id(session).await;
    state.auth_service().current_admin(user_id).await
}

/// Rotates the session id and binds it to `user`.
pub async fn establish_session(session: &Session, user: &User) -> anyhow::Result<()> {
    session.cycle_id().await?;
    session.insert(SESSION_USER_KEY, user.id).await?;
    Ok(())
}

// ============================================================================
// Middleware
// ============================================================================

/// Guards the JSON admin routes. Any failure is a 401 so non-admin accounts
/// cannot be told apart from anonymous callers.
pub async fn admin_guard(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = current_admin(&state, &session).await.map_err(|e| match e {
        AuthError::Database(_) | AuthError::Internal(_) => ApiError::from(e),
        _ => ApiError::unauthorized(),
    })?;

    tracing::Span::current().record("user_id", user.id);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login-link
/// The reply is the same whether or not the address has an account.
pub async fn request_login_link(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginLinkRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.auth_service().request_link(&payload.email).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "If that address belongs to an admin, a sign-in link is on its way",
    ))))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to clear session: {e}")))?;
    Ok(Json(ApiResponse::success(MessageResponse::new("Logged out"))))
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<SessionUserDto>>, ApiError> {
    let user = current_admin(&state, &session).await?;
    Ok(Json(ApiResponse::success(user.into())))
}
