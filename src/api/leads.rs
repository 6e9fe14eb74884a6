use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::{ApiJson, ApiPath, ApiQuery, validate_id};
use super::{ApiError, ApiResponse, AppState};
use crate::models::lead::{Lead, LeadInput, LeadQuery, LeadSource, LeadUpdate};
use crate::models::page::Page;
use crate::services::LeadError;

impl From<LeadError> for ApiError {
    fn from(err: LeadError) -> Self {
        match err {
            LeadError::NotFound(id) => Self::not_found("Lead", id),
            LeadError::Validation(msg) => Self::validation(msg),
            LeadError::Database(msg) => Self::DatabaseError(msg),
            LeadError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// POST /leads
/// Enquiries that reference a vehicle are tagged as vehicle enquiries.
pub async fn create(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<LeadInput>,
) -> Result<(StatusCode, Json<ApiResponse<Lead>>), ApiError> {
    let source = if input.vehicle_id.is_some() {
        LeadSource::VehicleEnquiry
    } else {
        LeadSource::Api
    };
    let lead = state.lead_service().create(input, source).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(lead))))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<LeadQuery>,
) -> Result<Json<ApiResponse<Page<Lead>>>, ApiError> {
    let page = state.lead_service().list(query).await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<Lead>>, ApiError> {
    let id = validate_id("lead", id)?;
    let lead = state.lead_service().get(id).await?;
    Ok(Json(ApiResponse::success(lead)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(update): ApiJson<LeadUpdate>,
) -> Result<Json<ApiResponse<Lead>>, ApiError> {
    let id = validate_id("lead", id)?;
    let lead = state.lead_service().update(id, update).await?;
    Ok(Json(ApiResponse::success(lead)))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_id("lead", id)?;
    state.lead_service().delete(id).await?;
    Ok(Json(ApiResponse::success(())))
}
