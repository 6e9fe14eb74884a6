use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{clean_optional, validation_message};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Testimonial {
    pub id: i32,
    pub name: String,
    pub role: Option<String>,
    pub rating: i32,
    pub content: String,
    pub featured: bool,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Highest position an admin may assign by hand.
pub const MAX_SORT_ORDER: i32 = 1_000_000;

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TestimonialInput {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "role must be at most 100 characters"))]
    pub role: Option<String>,

    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(min = 1, max = 1000, message = "content must be 1-1000 characters"))]
    pub content: String,

    #[serde(default)]
    pub featured: bool,

    #[serde(default = "default_true")]
    pub active: bool,

    /// Appended after the last testimonial when absent.
    #[serde(default)]
    #[validate(range(
        min = 0,
        max = MAX_SORT_ORDER,
        message = "sort_order must be between 0 and 1000000"
    ))]
    pub sort_order: Option<i32>,
}

impl TestimonialInput {
    /// # Errors
    ///
    /// Returns a human readable message describing every failed rule.
    pub fn prepare(mut self) -> Result<Self, String> {
        self.name = self.name.trim().to_string();
        self.content = self.content.trim().to_string();
        self.role = clean_optional(self.role);
        self.validate().map_err(|e| validation_message(&e))?;
        Ok(self)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<i32>,
}
