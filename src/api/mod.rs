use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::clients::mailer::Mailer;
use crate::config::Config;
use crate::state::SharedState;

pub mod assets;
pub mod auth;
mod error;
mod leads;
mod observability;
pub mod rate_limit;
mod settings;
mod system;
mod testimonials;
mod types;
mod uploads;
mod users;
pub mod validation;
mod vehicles;

pub use error::ApiError;
pub use types::*;

use tokio::sync::RwLock;

use crate::services::{
    AuthService, LeadService, RateLimitService, SettingsService, TestimonialService,
    UploadService, VehicleService,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn vehicle_service(&self) -> &Arc<dyn VehicleService> {
        &self.shared.vehicle_service
    }

    #[must_use]
    pub fn lead_service(&self) -> &Arc<dyn LeadService> {
        &self.shared.lead_service
    }

    #[must_use]
    pub fn testimonial_service(&self) -> &Arc<dyn TestimonialService> {
        &self.shared.testimonial_service
    }

    #[must_use]
    pub fn settings_service(&self) -> &Arc<dyn SettingsService> {
        &self.shared.settings_service
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn upload_service(&self) -> &Arc<UploadService> {
        &self.shared.upload_service
    }

    #[must_use]
    pub fn rate_limits(&self) -> &RateLimitService {
        &self.shared.rate_limits
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

/// Same as [`create_app_state_from_config`] with a caller-supplied mailer.
pub async fn create_app_state_with_mailer(
    config: Config,
    mailer: Arc<dyn Mailer>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::with_mailer(config, mailer).await?);
    Ok(create_app_state(shared, None))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, inactivity_minutes, uploads_dir) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_inactivity_minutes,
            config.storage.local_dir.clone(),
        )
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            inactivity_minutes,
        )));

    let api_router = Router::new()
        .merge(create_public_router(state.clone()))
        .nest("/admin", create_admin_router(state.clone()))
        .fallback(api_not_found);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .merge(crate::web::router(state.clone()))
        .route("/static/{*path}", get(assets::serve_static))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .fallback(crate::web::not_found)
        .with_state(state)
        .layer(session_layer)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

fn create_public_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let lead_submit = Router::new()
        .route("/leads", post(leads::create))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::contact_limit,
        ));

    let login_link = Router::new()
        .route("/auth/login-link", post(auth::request_login_link))
        .route_layer(middleware::from_fn_with_state(
            state,
            rate_limit::login_limit,
        ));

    Router::new()
        .route("/vehicles", get(vehicles::list_public))
        .route("/vehicles/featured", get(vehicles::featured))
        .route("/vehicles/makes", get(vehicles::makes))
        .route("/vehicles/{id}", get(vehicles::get_public))
        .route("/testimonials", get(testimonials::list_public))
        .route("/settings", get(settings::get_settings))
        .route("/health/live", get(system::health_live))
        .route("/health/ready", get(system::health_ready))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .merge(lead_submit)
        .merge(login_link)
}

fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let upload_limit = state.upload_service().max_upload_bytes() + uploads::MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route(
            "/vehicles",
            get(vehicles::list_admin).post(vehicles::create),
        )
        .route(
            "/vehicles/{id}",
            get(vehicles::get_admin)
                .put(vehicles::update)
                .delete(vehicles::delete),
        )
        .route("/vehicles/{id}/featured", put(vehicles::set_featured))
        .route("/leads", get(leads::list))
        .route(
            "/leads/{id}",
            get(leads::get).patch(leads::update).delete(leads::delete),
        )
        .route(
            "/testimonials",
            get(testimonials::list_all).post(testimonials::create),
        )
        .route("/testimonials/order", put(testimonials::reorder))
        .route(
            "/testimonials/{id}",
            put(testimonials::update).delete(testimonials::delete),
        )
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route(
            "/uploads",
            post(uploads::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/uploads/signature", post(uploads::signature))
        .route("/users", get(users::list).post(users::create))
        .route("/users/{id}", delete(users::delete))
        .route("/stats", get(system::get_stats))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::admin_guard))
}
