//! `SeaORM` implementation of the `LeadService` trait.

use crate::clients::mailer::{Email, Mailer};
use crate::config::Config;
use crate::db::{Store, timestamp};
use crate::models::lead::{Lead, LeadInput, LeadQuery, LeadSource, LeadStatus, LeadUpdate};
use crate::models::page::Page;
use crate::models::vehicle::Vehicle;
use crate::services::lead_service::{LeadError, LeadService};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use validator::Validate;

pub struct SeaOrmLeadService {
    store: Store,
    mailer: Arc<dyn Mailer>,
    config: Arc<RwLock<Config>>,
}

impl SeaOrmLeadService {
    #[must_use]
    pub fn new(store: Store, mailer: Arc<dyn Mailer>, config: Arc<RwLock<Config>>) -> Self {
        Self {
            store,
            mailer,
            config,
        }
    }

    async fn notify(&self, lead: &Lead, vehicle: Option<&Vehicle>) {
        let (notify_to, site_name, base_url) = {
            let config = self.config.read().await;
            (
                config.email.notify_to.clone(),
                config.site.name.clone(),
                config.site.base_url.clone(),
            )
        };

        if notify_to.is_empty() {
            return;
        }

        let email = Email {
            to: notify_to,
            subject: format!("[{site_name}] New enquiry from {}", lead.name),
            html: notification_body(lead, vehicle, &base_url),
        };

        if let Err(e) = self.mailer.send(&email).await {
            warn!(lead_id = lead.id, error = %e, "Failed to send lead notification");
        }
    }
}

fn notification_body(lead: &Lead, vehicle: Option<&Vehicle>, base_url: &str) -> String {
    let mut rows = String::new();
    let mut row = |label: &str, value: &str| {
        let _ = write!(
            rows,
            "<tr><th align=\"left\">{}</th><td>{}</td></tr>",
            encode_text(label),
            encode_text(value)
        );
    };

    row("Name", &lead.name);
    row("Contact", &lead.contact);
    if let Some(v) = &lead.make_model {
        row("Looking for", v);
    }
    if let Some(v) = &lead.budget {
        row("Budget", v);
    }
    if let Some(v) = vehicle {
        row("Vehicle", &format!("{} (#{})", v.title(), v.id));
    }
    row("Source", lead.source.as_str());
    if let Some(extra) = lead.extra.as_object() {
        for (key, value) in extra {
            let value = value
                .as_str()
                .map_or_else(|| value.to_string(), ToString::to_string);
            row(key.as_str(), &value);
        }
    }

    let message = lead
        .message
        .as_deref()
        .map(|m| format!("<p>{}</p>", encode_text(m)))
        .unwrap_or_default();

    format!(
        "<h2>New enquiry</h2><table>{rows}</table>{message}\
         <p><a href=\"{}/admin/leads\">Open the leads board</a></p>",
        encode_double_quoted_attribute(base_url.trim_end_matches('/'))
    )
}

#[async_trait]
impl LeadService for SeaOrmLeadService {
    async fn create(&self, input: LeadInput, source: LeadSource) -> Result<Lead, LeadError> {
        let input = input.prepare().map_err(LeadError::Validation)?;

        let vehicle = match input.vehicle_id {
            Some(id) => {
                let vehicle = self
                    .store
                    .vehicles()
                    .get(id)
                    .await?
                    .filter(|v| v.status.is_public())
                    .ok_or_else(|| {
                        LeadError::Validation(format!("vehicle {id} is not available"))
                    })?;
                Some(vehicle)
            }
            None => None,
        };

        let lead = self.store.leads().create(&input, source).await?;

        metrics::counter!("leads_created_total", "source" => source.as_str()).increment(1);
        info!(
            event = "lead_created",
            lead_id = lead.id,
            source = source.as_str(),
            vehicle_id = ?lead.vehicle_id,
            "New lead received"
        );

        self.notify(&lead, vehicle.as_ref()).await;

        Ok(lead)
    }

    async fn list(&self, query: LeadQuery) -> Result<Page<Lead>, LeadError> {
        let filter = query.into_filter().map_err(LeadError::Validation)?;
        Ok(self.store.leads().list(&filter).await?)
    }

    async fn get(&self, id: i32) -> Result<Lead, LeadError> {
        self.store
            .leads()
            .get(id)
            .await?
            .ok_or(LeadError::NotFound(id))
    }

    async fn update(&self, id: i32, update: LeadUpdate) -> Result<Lead, LeadError> {
        update
            .validate()
            .map_err(|e| LeadError::Validation(crate::models::validation_message(&e)))?;

        let lead = self
            .store
            .leads()
            .update(id, &update)
            .await?
            .ok_or(LeadError::NotFound(id))?;

        info!(event = "lead_updated", lead_id = id, status = %lead.status);
        Ok(lead)
    }

    async fn delete(&self, id: i32) -> Result<(), LeadError> {
        if !self.store.leads().delete(id).await? {
            return Err(LeadError::NotFound(id));
        }
        info!(event = "lead_deleted", lead_id = id);
        Ok(())
    }

    async fn count_by_status(&self) -> Result<Vec<(LeadStatus, u64)>, LeadError> {
        Ok(self.store.leads().count_by_status().await?)
    }

    async fn count_recent(&self, days: i64) -> Result<u64, LeadError> {
        let since = timestamp(Utc::now() - Duration::days(days));
        Ok(self.store.leads().count_since(&since).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::mailer::LogMailer;
    use crate::models::vehicle::{FuelType, Transmission, VehicleInput, VehicleStatus};

    async fn setup() -> (SeaOrmLeadService, Arc<LogMailer>, Store) {
        let store = Store::in_memory().await.unwrap();
        let mailer = Arc::new(LogMailer::new());
        let mut config = Config::default();
        config.email.notify_to = "sales@example.com".to_string();
        let service = SeaOrmLeadService::new(
            store.clone(),
            mailer.clone(),
            Arc::new(RwLock::new(config)),
        );
        (service, mailer, store)
    }

    fn input() -> LeadInput {
        LeadInput {
            name: "Jo Bloggs".to_string(),
            contact: "jo@example.com".to_string(),
            make_model: Some("Mazda MX-5".to_string()),
            message: Some("<b>Soft top</b> please".to_string()),
            ..Default::default()
        }
    }

    async fn vehicle(store: &Store, status: VehicleStatus) -> i32 {
        let input = VehicleInput {
            make: "Mazda".to_string(),
            model: "MX-5".to_string(),
            year: 2019,
            mileage: 21_000,
            price: 14_500,
            fuel: FuelType::Petrol,
            transmission: Transmission::Manual,
            body_type: None,
            colour: None,
            description: None,
            images: vec![],
            featured: false,
            featured_position: None,
            status,
        };
        store.vehicles().create(&input).await.unwrap().id
    }

    #[tokio::test]
    async fn test_create_stores_new_lead_and_notifies() {
        let (service, mailer, _) = setup().await;

        let lead = service.create(input(), LeadSource::ContactForm).await.unwrap();
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.extra, serde_json::json!({}));

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "sales@example.com");
        assert!(sent[0].html.contains("&lt;b&gt;Soft top&lt;/b&gt;"));
    }

    #[tokio::test]
    async fn test_vehicle_must_be_public() {
        let (service, _, store) = setup().await;
        let draft = vehicle(&store, VehicleStatus::Draft).await;
        let listed = vehicle(&store, VehicleStatus::Available).await;

        let mut lead = input();
        lead.vehicle_id = Some(draft);
        assert!(matches!(
            service.create(lead, LeadSource::VehicleEnquiry).await,
            Err(LeadError::Validation(_))
        ));

        let mut lead = input();
        lead.vehicle_id = Some(9999);
        assert!(service.create(lead, LeadSource::VehicleEnquiry).await.is_err());

        let mut lead = input();
        lead.vehicle_id = Some(listed);
        let created = service.create(lead, LeadSource::VehicleEnquiry).await.unwrap();
        assert_eq!(created.vehicle_id, Some(listed));
    }

    #[tokio::test]
    async fn test_update_list_and_counts() {
        let (service, _, _) = setup().await;
        let first = service.create(input(), LeadSource::Api).await.unwrap();
        let mut other = input();
        other.name = "Alex Smith".to_string();
        service.create(other, LeadSource::Api).await.unwrap();

        let updated = service
            .update(
                first.id,
                LeadUpdate {
                    status: Some(LeadStatus::Contacted),
                    notes: Some("Called back".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, LeadStatus::Contacted);
        assert_eq!(updated.notes.as_deref(), Some("Called back"));

        let page = service
            .list(LeadQuery {
                q: Some("alex".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);

        let counts = service.count_by_status().await.unwrap();
        assert!(counts.contains(&(LeadStatus::New, 1)));
        assert!(counts.contains(&(LeadStatus::Contacted, 1)));
        assert_eq!(service.count_recent(7).await.unwrap(), 2);

        service.delete(first.id).await.unwrap();
        assert!(matches!(
            service.get(first.id).await,
            Err(LeadError::NotFound(_))
        ));
    }
}
