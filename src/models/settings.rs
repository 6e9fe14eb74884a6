//! Site settings document: hero copy, SEO fields and contact details.
//!
//! Stored as a single JSON blob and validated as a whole on every write.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::validation_message;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SiteSettings {
    #[validate(nested)]
    pub hero: HeroSettings,

    #[validate(nested)]
    pub seo: SeoSettings,

    #[validate(nested)]
    pub contact: ContactSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct HeroSettings {
    #[validate(length(min = 1, max = 120, message = "hero headline must be 1-120 characters"))]
    pub headline: String,

    #[validate(length(max = 300, message = "hero subheadline must be at most 300 characters"))]
    pub subheadline: String,

    #[validate(length(min = 1, max = 40, message = "hero call to action must be 1-40 characters"))]
    pub cta_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SeoSettings {
    #[validate(length(min = 1, max = 70, message = "SEO title must be 1-70 characters"))]
    pub title: String,

    #[validate(length(max = 160, message = "SEO description must be at most 160 characters"))]
    pub description: String,

    #[validate(custom(function = "validate_keywords"))]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ContactSettings {
    #[validate(email(message = "contact email must be a valid address"))]
    pub email: String,

    #[validate(length(max = 40, message = "phone must be at most 40 characters"))]
    pub phone: String,

    #[validate(length(max = 300, message = "address must be at most 300 characters"))]
    pub address: String,

    #[validate(length(max = 40, message = "whatsapp must be at most 40 characters"))]
    pub whatsapp: Option<String>,

    #[validate(length(max = 200, message = "opening hours must be at most 200 characters"))]
    pub opening_hours: Option<String>,
}

#[allow(clippy::ptr_arg)]
fn validate_keywords(keywords: &Vec<String>) -> Result<(), ValidationError> {
    if keywords.len() > 20 {
        return Err(ValidationError::new("keywords").with_message("at most 20 SEO keywords".into()));
    }
    if keywords.iter().any(|k| k.trim().is_empty() || k.chars().count() > 40) {
        return Err(
            ValidationError::new("keywords").with_message("SEO keywords must be 1-40 characters".into()),
        );
    }
    Ok(())
}

impl Default for HeroSettings {
    fn default() -> Self {
        Self {
            headline: "Your next car, sourced for you".to_string(),
            subheadline: "Tell us what you want to drive. We search the trade, inspect the car and deliver it to your door."
                .to_string(),
            cta_label: "Start your search".to_string(),
        }
    }
}

impl Default for SeoSettings {
    fn default() -> Self {
        Self {
            title: "AutoSource | Vehicle sourcing specialists".to_string(),
            description: "Independent vehicle sourcing. Hand-picked used cars, inspected and delivered."
                .to_string(),
            keywords: vec!["vehicle sourcing".to_string(), "used cars".to_string()],
        }
    }
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            email: "hello@example.com".to_string(),
            phone: "0000 000000".to_string(),
            address: String::new(),
            whatsapp: None,
            opening_hours: Some("Mon-Fri 9:00-18:00".to_string()),
        }
    }
}

impl SiteSettings {
    /// # Errors
    ///
    /// Returns a human readable message describing every failed rule.
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|e| validation_message(&e))
    }
}
