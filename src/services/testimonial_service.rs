use crate::models::testimonial::{Testimonial, TestimonialInput};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TestimonialError {
    #[error("Testimonial not found: {0}")]
    NotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for TestimonialError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for TestimonialError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait TestimonialService: Send + Sync {
    /// Active testimonials: featured first, then `sort_order`, then id.
    async fn list_public(&self) -> Result<Vec<Testimonial>, TestimonialError>;

    async fn list_all(&self) -> Result<Vec<Testimonial>, TestimonialError>;

    async fn get(&self, id: i32) -> Result<Testimonial, TestimonialError>;

    async fn create(&self, input: TestimonialInput) -> Result<Testimonial, TestimonialError>;

    async fn update(
        &self,
        id: i32,
        input: TestimonialInput,
    ) -> Result<Testimonial, TestimonialError>;

    async fn delete(&self, id: i32) -> Result<(), TestimonialError>;

    /// Sets `sort_order` to each id's index. Unknown or repeated ids reject the whole request.
    async fn reorder(&self, ids: Vec<i32>) -> Result<Vec<Testimonial>, TestimonialError>;
}
