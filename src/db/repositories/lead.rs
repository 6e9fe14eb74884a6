use crate::db::now_timestamp;
use crate::entities::{leads, prelude::*};
use crate::models::lead::{Lead, LeadFilter, LeadInput, LeadSource, LeadStatus, LeadUpdate};
use crate::models::page::Page;
use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::{contains_ci, page_count};

pub struct LeadRepository {
    conn: DatabaseConnection,
}

impl LeadRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: leads::Model) -> Lead {
        Lead {
            id: model.id,
            name: model.name,
            contact: model.contact,
            make_model: model.make_model,
            budget: model.budget,
            message: model.message,
            extra: serde_json::from_str(&model.extra)
                .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new())),
            source: model.source.parse().unwrap_or(LeadSource::Api),
            vehicle_id: model.vehicle_id,
            status: model.status.parse().unwrap_or_default(),
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    pub async fn create(&self, input: &LeadInput, source: LeadSource) -> Result<Lead> {
        let now = now_timestamp();
        let extra = input
            .extra
            .as_ref()
            .map_or_else(|| "{}".to_string(), ToString::to_string);

        let active = leads::ActiveModel {
            name: Set(input.name.clone()),
            contact: Set(input.contact.clone()),
            make_model: Set(input.make_model.clone()),
            budget: Set(input.budget.clone()),
            message: Set(input.message.clone()),
            extra: Set(extra),
            source: Set(source.as_str().to_string()),
            vehicle_id: Set(input.vehicle_id),
            status: Set(LeadStatus::New.as_str().to_string()),
            notes: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert lead")?;
        Ok(Self::map_model(model))
    }

    pub async fn list(&self, filter: &LeadFilter) -> Result<Page<Lead>> {
        let mut query = Leads::find();

        if let Some(status) = filter.status {
            query = query.filter(leads::Column::Status.eq(status.as_str()));
        }
        if let Some(q) = &filter.q {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(leads::Column::Name, q))
                    .add(contains_ci(leads::Column::Contact, q))
                    .add(contains_ci(leads::Column::MakeModel, q)),
            );
        }

        let pagination = filter.pagination;
        let paginator = query
            .order_by_desc(leads::Column::CreatedAt)
            .order_by_desc(leads::Column::Id)
            .paginate(&self.conn, pagination.per_page);

        let total = paginator.num_items().await.context("Failed to count leads")?;
        let items = paginator
            .fetch_page(pagination.page - 1)
            .await
            .context("Failed to fetch lead page")?;

        Ok(Page {
            items: items.into_iter().map(Self::map_model).collect(),
            page: pagination.page,
            per_page: pagination.per_page,
            total,
            total_pages: page_count(total, pagination.per_page),
        })
    }

    pub async fn get(&self, id: i32) -> Result<Option<Lead>> {
        let model = Leads::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query lead")?;
        Ok(model.map(Self::map_model))
    }

    pub async fn update(&self, id: i32, update: &LeadUpdate) -> Result<Option<Lead>> {
        let Some(model) = Leads::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: leads::ActiveModel = model.into();
        if let Some(status) = update.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(notes) = &update.notes {
            let notes = notes.trim();
            active.notes = Set((!notes.is_empty()).then(|| notes.to_string()));
        }
        active.updated_at = Set(now_timestamp());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update lead")?;
        Ok(Some(Self::map_model(model)))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Leads::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn count_by_status(&self) -> Result<Vec<(LeadStatus, u64)>> {
        let rows: Vec<(String, i64)> = Leads::find()
            .select_only()
            .column(leads::Column::Status)
            .column_as(Expr::col(leads::Column::Id).count(), "count")
            .group_by(leads::Column::Status)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count leads by status")?;

        Ok(LeadStatus::ALL
            .into_iter()
            .map(|status| {
                let count = rows
                    .iter()
                    .find(|(s, _)| s == status.as_str())
                    .map_or(0, |(_, c)| u64::try_from(*c).unwrap_or(0));
                (status, count)
            })
            .collect())
    }

    pub async fn count_since(&self, since: &str) -> Result<u64> {
        Leads::find()
            .filter(leads::Column::CreatedAt.gte(since))
            .count(&self.conn)
            .await
            .context("Failed to count recent leads")
    }
}
