use crate::db::now_timestamp;
use crate::entities::{prelude::*, vehicles};
use crate::models::page::Page;
use crate::models::vehicle::{
    FuelType, Transmission, Vehicle, VehicleFilter, VehicleInput, VehicleSort, VehicleStatus,
};
use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use tracing::warn;

use super::{contains_ci, equals_ci, page_count};

pub struct VehicleRepository {
    conn: DatabaseConnection,
}

impl VehicleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: vehicles::Model) -> Vehicle {
        let images = serde_json::from_str(&model.images).unwrap_or_else(|e| {
            warn!(vehicle_id = model.id, error = %e, "Discarding unreadable image list");
            Vec::new()
        });

        Vehicle {
            id: model.id,
            make: model.make,
            model: model.model,
            year: model.year,
            mileage: model.mileage,
            price: model.price,
            fuel: model.fuel.parse().unwrap_or(FuelType::Other),
            transmission: model.transmission.parse().unwrap_or(Transmission::Manual),
            body_type: model.body_type,
            colour: model.colour,
            description: model.description,
            images,
            featured: model.featured,
            featured_position: model.featured_position,
            status: model.status.parse().unwrap_or_default(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    fn apply_filter(mut query: Select<Vehicles>, filter: &VehicleFilter) -> Select<Vehicles> {
        if let Some(statuses) = &filter.statuses {
            query = query.filter(
                vehicles::Column::Status.is_in(statuses.iter().map(VehicleStatus::as_str)),
            );
        }
        if let Some(make) = &filter.make {
            query = query.filter(equals_ci(vehicles::Column::Make, make));
        }
        if let Some(q) = &filter.q {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(vehicles::Column::Make, q))
                    .add(contains_ci(vehicles::Column::Model, q)),
            );
        }
        if let Some(fuel) = filter.fuel {
            query = query.filter(vehicles::Column::Fuel.eq(fuel.as_str()));
        }
        if let Some(transmission) = filter.transmission {
            query = query.filter(vehicles::Column::Transmission.eq(transmission.as_str()));
        }
        if let Some(min) = filter.min_price {
            query = query.filter(vehicles::Column::Price.gte(min));
        }
        if let Some(max) = filter.max_price {
            query = query.filter(vehicles::Column::Price.lte(max));
        }
        if let Some(min) = filter.min_year {
            query = query.filter(vehicles::Column::Year.gte(min));
        }
        if let Some(max) = filter.max_year {
            query = query.filter(vehicles::Column::Year.lte(max));
        }
        if let Some(max) = filter.max_mileage {
            query = query.filter(vehicles::Column::Mileage.lte(max));
        }

        match filter.sort {
            VehicleSort::Newest => query.order_by_desc(vehicles::Column::CreatedAt),
            VehicleSort::PriceAsc => query.order_by_asc(vehicles::Column::Price),
            VehicleSort::PriceDesc => query.order_by_desc(vehicles::Column::Price),
            VehicleSort::MileageAsc => query.order_by_asc(vehicles::Column::Mileage),
            VehicleSort::YearDesc => query.order_by_desc(vehicles::Column::Year),
        }
        .order_by_desc(vehicles::Column::Id)
    }

    pub async fn list(&self, filter: &VehicleFilter) -> Result<Page<Vehicle>> {
        let pagination = filter.pagination;

        if filter.statuses.as_ref().is_some_and(Vec::is_empty) {
            return Ok(Page {
                items: Vec::new(),
                page: pagination.page,
                per_page: pagination.per_page,
                total: 0,
                total_pages: 0,
            });
        }

        let paginator = Self::apply_filter(Vehicles::find(), filter)
            .paginate(&self.conn, pagination.per_page);

        let total = paginator
            .num_items()
            .await
            .context("Failed to count vehicles")?;
        let items = paginator
            .fetch_page(pagination.page - 1)
            .await
            .context("Failed to fetch vehicle page")?;

        Ok(Page {
            items: items.into_iter().map(Self::map_model).collect(),
            page: pagination.page,
            per_page: pagination.per_page,
            total,
            total_pages: page_count(total, pagination.per_page),
        })
    }

    pub async fn get(&self, id: i32) -> Result<Option<Vehicle>> {
        let model = Vehicles::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query vehicle")?;
        Ok(model.map(Self::map_model))
    }

    /// Public featured vehicles ordered by position, unpositioned last, newest first.
    pub async fn featured(&self) -> Result<Vec<Vehicle>> {
        let models = Vehicles::find()
            .filter(vehicles::Column::Featured.eq(true))
            .filter(
                vehicles::Column::Status
                    .is_in(VehicleStatus::PUBLIC.iter().map(VehicleStatus::as_str)),
            )
            .order_by_desc(vehicles::Column::CreatedAt)
            .order_by_desc(vehicles::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query featured vehicles")?;

        let mut vehicles: Vec<Vehicle> = models.into_iter().map(Self::map_model).collect();
        // stable sort keeps the newest-first order within a position
        vehicles.sort_by_key(|v| v.featured_position.unwrap_or(i32::MAX));
        Ok(vehicles)
    }

    pub async fn makes(&self) -> Result<Vec<String>> {
        let mut makes: Vec<String> = Vehicles::find()
            .select_only()
            .column(vehicles::Column::Make)
            .distinct()
            .filter(
                vehicles::Column::Status
                    .is_in(VehicleStatus::PUBLIC.iter().map(VehicleStatus::as_str)),
            )
            .order_by_asc(vehicles::Column::Make)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query makes")?;

        // One entry per make regardless of how it was capitalised.
        makes.sort_by_key(|m| m.to_lowercase());
        makes.dedup_by(|a, b| a.to_lowercase() == b.to_lowercase());
        Ok(makes)
    }

    pub async fn create(&self, input: &VehicleInput) -> Result<Vehicle> {
        let now = now_timestamp();
        let mut active = vehicles::ActiveModel {
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };
        Self::apply_input(&mut active, input)?;

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert vehicle")?;
        Ok(Self::map_model(model))
    }

    pub async fn update(&self, id: i32, input: &VehicleInput) -> Result<Option<Vehicle>> {
        let Some(model) = Vehicles::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: vehicles::ActiveModel = model.into();
        Self::apply_input(&mut active, input)?;
        active.updated_at = Set(now_timestamp());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update vehicle")?;
        Ok(Some(Self::map_model(model)))
    }

    fn apply_input(active: &mut vehicles::ActiveModel, input: &VehicleInput) -> Result<()> {
        active.make = Set(input.make.clone());
        active.model = Set(input.model.clone());
        active.year = Set(input.year);
        active.mileage = Set(input.mileage);
        active.price = Set(input.price);
        active.fuel = Set(input.fuel.as_str().to_string());
        active.transmission = Set(input.transmission.as_str().to_string());
        active.body_type = Set(input.body_type.clone());
        active.colour = Set(input.colour.clone());
        active.description = Set(input.description.clone());
        active.images = Set(serde_json::to_string(&input.images)?);
        active.featured = Set(input.featured);
        active.featured_position = Set(input.featured_position);
        active.status = Set(input.status.as_str().to_string());
        Ok(())
    }

    pub async fn set_featured(
        &self,
        id: i32,
        featured: bool,
        position: Option<i32>,
    ) -> Result<Option<Vehicle>> {
        let Some(model) = Vehicles::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: vehicles::ActiveModel = model.into();
        active.featured = Set(featured);
        active.featured_position = Set(if featured { position } else { None });
        active.updated_at = Set(now_timestamp());

        let model = active.update(&self.conn).await?;
        Ok(Some(Self::map_model(model)))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Vehicles::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete vehicle")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn count_by_status(&self) -> Result<Vec<(VehicleStatus, u64)>> {
        let rows: Vec<(String, i64)> = Vehicles::find()
            .select_only()
            .column(vehicles::Column::Status)
            .column_as(Expr::col(vehicles::Column::Id).count(), "count")
            .group_by(vehicles::Column::Status)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count vehicles by status")?;

        Ok(VehicleStatus::ALL
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
}
