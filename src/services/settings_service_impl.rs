use crate::db::Store;
use crate::models::settings::SiteSettings;
use crate::services::settings_service::{SettingsError, SettingsService};
use async_trait::async_trait;
use tracing::info;

pub struct SeaOrmSettingsService {
    store: Store,
}

impl SeaOrmSettingsService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SettingsService for SeaOrmSettingsService {
    async fn get(&self) -> Result<SiteSettings, SettingsError> {
        Ok(self.store.settings().get().await?.unwrap_or_default())
    }

    async fn update(&self, settings: SiteSettings) -> Result<SiteSettings, SettingsError> {
        settings.check().map_err(SettingsError::Validation)?;
        self.store.settings().upsert(&settings).await?;
        info!(event = "settings_updated", "Site settings saved");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_defaults_then_upsert() {
        let service = SeaOrmSettingsService::new(Store::in_memory().await.unwrap());
        assert_eq!(service.get().await.unwrap(), SiteSettings::default());

        let mut settings = SiteSettings::default();
        settings.hero.headline = "Cars found, not fished for".to_string();
        service.update(settings.clone()).await.unwrap();

        settings.contact.phone = "01632 960000".to_string();
        service.update(settings.clone()).await.unwrap();
        assert_eq!(service.get().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn test_invalid_settings_are_not_saved() {
        let service = SeaOrmSettingsService::new(Store::in_memory().await.unwrap());
        let mut settings = SiteSettings::default();
        settings.hero.headline = String::new();

        assert!(matches!(
            service.update(settings).await,
            Err(SettingsError::Validation(_))
        ));
        assert_eq!(service.get().await.unwrap(), SiteSettings::default());
    }
}
