//! Domain service for enquiries submitted through the public forms.

use crate::models::lead::{Lead, LeadInput, LeadQuery, LeadSource, LeadStatus, LeadUpdate};
use crate::models::page::Page;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeadError {
    #[error("Lead not found: {0}")]
    NotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for LeadError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for LeadError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait LeadService: Send + Sync {
    /// Validates and stores a new lead, then notifies the brokerage by e-mail.
    ///
    /// A failed notification is logged and does not fail the call.
    ///
    /// # Errors
    ///
    /// Returns [`LeadError::Validation`] for bad input or a vehicle that is not public.
    async fn create(&self, input: LeadInput, source: LeadSource) -> Result<Lead, LeadError>;

    /// Newest first.
    async fn list(&self, query: LeadQuery) -> Result<Page<Lead>, LeadError>;

    async fn get(&self, id: i32) -> Result<Lead, LeadError>;

    async fn update(&self, id: i32, update: LeadUpdate) -> Result<Lead, LeadError>;

    async fn delete(&self, id: i32) -> Result<(), LeadError>;

    async fn count_by_status(&self) -> Result<Vec<(LeadStatus, u64)>, LeadError>;

    /// Leads created in the last `days` days.
    async fn count_recent(&self, days: i64) -> Result<u64, LeadError>;
}
