use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::{ApiJson, ApiPath, validate_id};
use super::{ApiError, ApiResponse, AppState};
use crate::models::testimonial::{ReorderRequest, Testimonial, TestimonialInput};
use crate::services::TestimonialError;

impl From<TestimonialError> for ApiError {
    fn from(err: TestimonialError) -> Self {
        match err {
            TestimonialError::NotFound(id) => Self::not_found("Testimonial", id),
            TestimonialError::Validation(msg) => Self::validation(msg),
            TestimonialError::Database(msg) => Self::DatabaseError(msg),
            TestimonialError::Internal(msg) => Self::internal(msg),
        }
    }
}

pub async fn list_public(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Testimonial>>>, ApiError> {
    let testimonials = state.testimonial_service().list_public().await?;
    Ok(Json(ApiResponse::success(testimonials)))
}

pub async fn list_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Testimonial>>>, ApiError> {
    let testimonials = state.testimonial_service().list_all().await?;
    Ok(Json(ApiResponse::success(testimonials)))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<TestimonialInput>,
) -> Result<(StatusCode, Json<ApiResponse<Testimonial>>), ApiError> {
    let testimonial = state.testimonial_service().create(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(testimonial))))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<TestimonialInput>,
) -> Result<Json<ApiResponse<Testimonial>>, ApiError> {
    let id = validate_id("testimonial", id)?;
    let testimonial = state.testimonial_service().update(id, input).await?;
    Ok(Json(ApiResponse::success(testimonial)))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_id("testimonial", id)?;
    state.testimonial_service().delete(id).await?;
    Ok(Json(ApiResponse::success(())))
}

/// PUT /admin/testimonials/order
pub async fn reorder(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<ReorderRequest>,
) -> Result<Json<ApiResponse<Vec<Testimonial>>>, ApiError> {
    let testimonials = state.testimonial_service().reorder(payload.ids).await?;
    Ok(Json(ApiResponse::success(testimonials)))
}
