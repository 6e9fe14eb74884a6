use crate::models::settings::SiteSettings;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for SettingsError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for SettingsError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait SettingsService: Send + Sync {
    /// Stored settings, or the defaults when nothing has been saved yet.
    async fn get(&self) -> Result<SiteSettings, SettingsError>;

    /// Validates the whole document, then upserts it.
    async fn update(&self, settings: SiteSettings) -> Result<SiteSettings, SettingsError>;
}
