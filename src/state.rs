use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::mailer::{Mailer, build_mailer};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, Housekeeping, LeadService, RateLimitService, SeaOrmAuthService,
    SeaOrmLeadService, SeaOrmSettingsService, SeaOrmTestimonialService, SeaOrmVehicleService,
    SettingsService, TestimonialService, UploadService, VehicleService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub mailer: Arc<dyn Mailer>,

    pub vehicle_service: Arc<dyn VehicleService>,

    pub lead_service: Arc<dyn LeadService>,

    pub testimonial_service: Arc<dyn TestimonialService>,

    pub settings_service: Arc<dyn SettingsService>,

    pub auth_service: Arc<dyn AuthService>,

    pub upload_service: Arc<UploadService>,

    pub rate_limits: RateLimitService,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let mailer = build_mailer(&config.email)?;
        Self::with_mailer(config, mailer).await
    }

    /// Builds the state around a caller-supplied mailer (tests inspect what was sent).
    pub async fn with_mailer(config: Config, mailer: Arc<dyn Mailer>) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;

        let upload_service = Arc::new(UploadService::new(&config)?);
        let rate_limits = RateLimitService::new(&config.rate_limit);
        let bootstrap_admins = config.auth.bootstrap_admins.clone();
        let config = Arc::new(RwLock::new(config));

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            mailer.clone(),
            config.clone(),
        )) as Arc<dyn AuthService>;

        if !bootstrap_admins.is_empty() {
            auth_service
                .bootstrap_admins(&bootstrap_admins)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to bootstrap admins: {e}"))?;
        }

        let lead_service = Arc::new(SeaOrmLeadService::new(
            store.clone(),
            mailer.clone(),
            config.clone(),
        )) as Arc<dyn LeadService>;

        Ok(Self {
            config,
            vehicle_service: Arc::new(SeaOrmVehicleService::new(store.clone())),
            testimonial_service: Arc::new(SeaOrmTestimonialService::new(store.clone())),
            settings_service: Arc::new(SeaOrmSettingsService::new(store.clone())),
            lead_service,
            auth_service,
            upload_service,
            rate_limits,
            mailer,
            store,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }

    #[must_use]
    pub fn housekeeping(&self) -> Housekeeping {
        Housekeeping::new(self.auth_service.clone(), self.rate_limits.clone())
    }
}
