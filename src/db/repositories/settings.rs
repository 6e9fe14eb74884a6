use crate::db::now_timestamp;
use crate::entities::site_settings;
use crate::models::settings::SiteSettings;
use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use tracing::warn;

const SETTINGS_ID: i32 = 1;

pub struct SettingsRepository {
    conn: DatabaseConnection,
}

impl SettingsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Stored settings, or `None` when the row has never been written.
    pub async fn get(&self) -> Result<Option<SiteSettings>> {
        let Some(row) = site_settings::Entity::find_by_id(SETTINGS_ID)
            .one(&self.conn)
            .await
            .context("Failed to query site settings")?
        else {
            return Ok(None);
        };

        match serde_json::from_str(&row.data) {
            Ok(settings) => Ok(Some(settings)),
            Err(e) => {
                warn!(error = %e, "Stored site settings are unreadable, using defaults");
                Ok(None)
            }
        }
    }

    pub async fn upsert(&self, settings: &SiteSettings) -> Result<()> {
        let data = serde_json::to_string(settings)?;

        let active = site_settings::ActiveModel {
            id: Set(SETTINGS_ID),
            data: Set(data),
            updated_at: Set(now_timestamp()),
        };

        site_settings::Entity::insert(active)
            .on_conflict(
                OnConflict::column(site_settings::Column::Id)
                    .update_columns([site_settings::Column::Data, site_settings::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("Failed to save site settings")?;

        Ok(())
    }
}
