//! `SeaORM` implementation of the `VehicleService` trait.

use crate::db::Store;
use crate::models::page::Page;
use crate::models::vehicle::{Vehicle, VehicleInput, VehicleQuery, VehicleStatus};
use crate::services::vehicle_service::{VehicleError, VehicleService};
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use tracing::info;

pub struct SeaOrmVehicleService {
    store: Store,
}

impl SeaOrmVehicleService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn list(
        &self,
        query: VehicleQuery,
        public_only: bool,
    ) -> Result<Page<Vehicle>, VehicleError> {
        let filter = query
            .into_filter(public_only)
            .map_err(VehicleError::Validation)?;
        Ok(self.store.vehicles().list(&filter).await?)
    }

    fn prepare(input: VehicleInput) -> Result<VehicleInput, VehicleError> {
        input
            .prepare(Utc::now().year())
            .map_err(VehicleError::Validation)
    }
}

#[async_trait]
impl VehicleService for SeaOrmVehicleService {
    async fn list_public(&self, query: VehicleQuery) -> Result<Page<Vehicle>, VehicleError> {
        self.list(query, true).await
    }

    async fn list_admin(&self, query: VehicleQuery) -> Result<Page<Vehicle>, VehicleError> {
        self.list(query, false).await
    }

    async fn featured(&self, limit: usize) -> Result<Vec<Vehicle>, VehicleError> {
        let mut vehicles = self.store.vehicles().featured().await?;
        vehicles.truncate(limit);
        Ok(vehicles)
    }

    async fn makes(&self) -> Result<Vec<String>, VehicleError> {
        Ok(self.store.vehicles().makes().await?)
    }

    async fn get_public(&self, id: i32) -> Result<Vehicle, VehicleError> {
        self.store
            .vehicles()
            .get(id)
            .await?
            .filter(|v| v.status.is_public())
            .ok_or(VehicleError::NotFound(id))
    }

    async fn get(&self, id: i32) -> Result<Vehicle, VehicleError> {
        self.store
            .vehicles()
            .get(id)
            .await?
            .ok_or(VehicleError::NotFound(id))
    }

    async fn create(&self, input: VehicleInput) -> Result<Vehicle, VehicleError> {
        let input = Self::prepare(input)?;
        let vehicle = self.store.vehicles().create(&input).await?;

        info!(
            event = "vehicle_created",
            vehicle_id = vehicle.id,
            status = %vehicle.status,
            "Created vehicle {}",
            vehicle.title()
        );
        Ok(vehicle)
    }

    async fn update(&self, id: i32, input: VehicleInput) -> Result<Vehicle, VehicleError> {
        let input = Self::prepare(input)?;
        let vehicle = self
            .store
            .vehicles()
            .update(id, &input)
            .await?
            .ok_or(VehicleError::NotFound(id))?;

        info!(event = "vehicle_updated", vehicle_id = id, status = %vehicle.status);
        Ok(vehicle)
    }

    async fn delete(&self, id: i32) -> Result<(), VehicleError> {
        if !self.store.vehicles().delete(id).await? {
            return Err(VehicleError::NotFound(id));
        }
        info!(event = "vehicle_deleted", vehicle_id = id);
        Ok(())
    }

    async fn set_featured(
        &self,
        id: i32,
        featured: bool,
        position: Option<i32>,
    ) -> Result<Vehicle, VehicleError> {
        if let Some(p) = position
            && !(0..=100).contains(&p)
        {
            return Err(VehicleError::Validation(
                "featured_position must be between 0 and 100".to_string(),
            ));
        }

        let vehicle = self
            .store
            .vehicles()
            .set_featured(id, featured, position)
            .await?
            .ok_or(VehicleError::NotFound(id))?;

        info!(event = "vehicle_featured", vehicle_id = id, featured, position = ?vehicle.featured_position);
        Ok(vehicle)
    }

    async fn count_by_status(&self) -> Result<Vec<(VehicleStatus, u64)>, VehicleError> {
        Ok(self.store.vehicles().count_by_status().await?)
    }
}
