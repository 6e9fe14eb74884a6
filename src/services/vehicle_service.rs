//! Domain service for the vehicle catalogue.
//!
//! Public callers only ever see non-draft vehicles; admin callers see everything.

use crate::models::page::Page;
use crate::models::vehicle::{Vehicle, VehicleInput, VehicleQuery, VehicleStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VehicleError {
    #[error("Vehicle not found: {0}")]
    NotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for VehicleError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for VehicleError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait VehicleService: Send + Sync {
    /// Filtered, sorted, paginated listing of public vehicles.
    ///
    /// # Errors
    ///
    /// Returns [`VehicleError::Validation`] for bad filters or pagination.
    async fn list_public(&self, query: VehicleQuery) -> Result<Page<Vehicle>, VehicleError>;

    /// Same as [`Self::list_public`] but drafts are included and `status` may filter them.
    async fn list_admin(&self, query: VehicleQuery) -> Result<Page<Vehicle>, VehicleError>;

    /// Public featured vehicles in featured order, at most `limit`.
    async fn featured(&self, limit: usize) -> Result<Vec<Vehicle>, VehicleError>;

    /// Distinct makes across public vehicles, sorted.
    async fn makes(&self) -> Result<Vec<String>, VehicleError>;

    /// # Errors
    ///
    /// Returns [`VehicleError::NotFound`] for missing and draft vehicles alike.
    async fn get_public(&self, id: i32) -> Result<Vehicle, VehicleError>;

    async fn get(&self, id: i32) -> Result<Vehicle, VehicleError>;

    async fn create(&self, input: VehicleInput) -> Result<Vehicle, VehicleError>;

    async fn update(&self, id: i32, input: VehicleInput) -> Result<Vehicle, VehicleError>;

    async fn delete(&self, id: i32) -> Result<(), VehicleError>;

    /// Toggles the featured flag. The position is cleared when unfeaturing.
    async fn set_featured(
        &self,
        id: i32,
        featured: bool,
        position: Option<i32>,
    ) -> Result<Vehicle, VehicleError>;

    async fn count_by_status(&self) -> Result<Vec<(VehicleStatus, u64)>, VehicleError>;
}
