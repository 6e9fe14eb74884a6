//! Health probes and the dashboard summary.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, HealthLiveResponse, HealthReadyResponse, StatsDto,
    StatusCount,
};

const RECENT_LEAD_DAYS: i64 = 7;

/// `GET /api/health/live`
///
/// Lightweight liveness probe to indicate the process is running.
pub async fn health_live() -> impl IntoResponse {
    Json(ApiResponse::success(HealthLiveResponse { status: "alive" }))
}

/// `GET /api/health/ready`
///
/// Readiness probe that checks database connectivity.
pub async fn health_ready(State(state): State<Arc<AppState>>) -> Response {
    let db_ready = state.store().ping().await.is_ok();

    let status = if db_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::success(HealthReadyResponse {
            ready: db_ready,
            database: db_ready,
        })),
    )
        .into_response()
}

/// `GET /api/admin/stats`
///
/// Counts per vehicle and lead status for the dashboard.
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<StatsDto>>, ApiError> {
    let vehicles = state
        .vehicle_service()
        .count_by_status()
        .await?
        .into_iter()
        .map(|(status, count)| StatusCount {
            status: status.as_str().to_string(),
            count,
        })
        .collect();

    let leads = state
        .lead_service()
        .count_by_status()
        .await?
        .into_iter()
        .map(|(status, count)| StatusCount {
            status: status.as_str().to_string(),
            count,
        })
        .collect();

    let leads_last_7_days = state.lead_service().count_recent(RECENT_LEAD_DAYS).await?;
    let active_testimonials = state.testimonial_service().list_public().await?.len();

    Ok(Json(ApiResponse::success(StatsDto {
        vehicles,
        leads,
        leads_last_7_days,
        active_testimonials,
        uptime_seconds: state.start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
    })))
}
