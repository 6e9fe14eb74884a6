use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{ApiJson, ApiPath, ApiQuery, validate_id};
use super::{ApiError, ApiResponse, AppState, FeaturedRequest};
use crate::models::page::Page;
use crate::models::vehicle::{Vehicle, VehicleInput, VehicleQuery};
use crate::services::VehicleError;

const DEFAULT_FEATURED_LIMIT: usize = 6;
const MAX_FEATURED_LIMIT: usize = 24;

impl From<VehicleError> for ApiError {
    fn from(err: VehicleError) -> Self {
        match err {
            VehicleError::NotFound(id) => Self::not_found("Vehicle", id),
            VehicleError::Validation(msg) => Self::validation(msg),
            VehicleError::Database(msg) => Self::DatabaseError(msg),
            VehicleError::Internal(msg) => Self::internal(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FeaturedQuery {
    pub limit: Option<usize>,
}

pub async fn list_public(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<VehicleQuery>,
) -> Result<Json<ApiResponse<Page<Vehicle>>>, ApiError> {
    let page = state.vehicle_service().list_public(query).await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn featured(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<FeaturedQuery>,
) -> Result<Json<ApiResponse<Vec<Vehicle>>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_FEATURED_LIMIT)
        .clamp(1, MAX_FEATURED_LIMIT);
    let vehicles = state.vehicle_service().featured(limit).await?;
    Ok(Json(ApiResponse::success(vehicles)))
}

pub async fn makes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let makes = state.vehicle_service().makes().await?;
    Ok(Json(ApiResponse::success(makes)))
}

pub async fn get_public(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<Vehicle>>, ApiError> {
    let id = validate_id("vehicle", id)?;
    let vehicle = state.vehicle_service().get_public(id).await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

// ============================================================================
// Admin
// ============================================================================

pub async fn list_admin(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<VehicleQuery>,
) -> Result<Json<ApiResponse<Page<Vehicle>>>, ApiError> {
    let page = state.vehicle_service().list_admin(query).await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn get_admin(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<Vehicle>>, ApiError> {
    let id = validate_id("vehicle", id)?;
    let vehicle = state.vehicle_service().get(id).await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<VehicleInput>,
) -> Result<(StatusCode, Json<ApiResponse<Vehicle>>), ApiError> {
    let vehicle = state.vehicle_service().create(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(vehicle))))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<VehicleInput>,
) -> Result<Json<ApiResponse<Vehicle>>, ApiError> {
    let id = validate_id("vehicle", id)?;
    let vehicle = state.vehicle_service().update(id, input).await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_id("vehicle", id)?;
    state.vehicle_service().delete(id).await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn set_featured(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<FeaturedRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, ApiError> {
    let id = validate_id("vehicle", id)?;
    let vehicle = state
        .vehicle_service()
        .set_featured(id, payload.featured, payload.position)
        .await?;
    Ok(Json(ApiResponse::success(vehicle)))
}
