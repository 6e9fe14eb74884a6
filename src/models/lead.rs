use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::page::Pagination;
use super::{clean_optional, empty_as_none, validation_message};

pub const MAX_EXTRA_KEYS: usize = 20;
pub const MAX_EXTRA_BYTES: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Won,
    Lost,
}

impl LeadStatus {
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::Contacted,
        Self::Qualified,
        Self::Won,
        Self::Lost,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown lead status: {s}"))
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    ContactForm,
    VehicleEnquiry,
    Api,
}

impl LeadSource {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ContactForm => "contact_form",
            Self::VehicleEnquiry => "vehicle_enquiry",
            Self::Api => "api",
        }
    }
}

impl FromStr for LeadSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contact_form" => Ok(Self::ContactForm),
            "vehicle_enquiry" => Ok(Self::VehicleEnquiry),
            "api" => Ok(Self::Api),
            _ => Err(format!("unknown lead source: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Lead {
    pub id: i32,
    pub name: String,
    pub contact: String,
    pub make_model: Option<String>,
    pub budget: Option<String>,
    pub message: Option<String>,
    pub extra: Value,
    pub source: LeadSource,
    pub vehicle_id: Option<i32>,
    pub status: LeadStatus,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Public submission payload (contact form and enquiry form).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LeadInput {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 3, max = 200, message = "contact must be 3-200 characters"))]
    pub contact: String,

    #[serde(default)]
    #[validate(length(max = 200, message = "make/model must be at most 200 characters"))]
    pub make_model: Option<String>,

    #[serde(default)]
    #[validate(length(max = 50, message = "budget must be at most 50 characters"))]
    pub budget: Option<String>,

    #[serde(default)]
    #[validate(length(max = 2000, message = "message must be at most 2000 characters"))]
    pub message: Option<String>,

    #[serde(default)]
    pub extra: Option<Value>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub vehicle_id: Option<i32>,
}

impl LeadInput {
    /// Validates and normalises the submission.
    ///
    /// # Errors
    ///
    /// Returns a human readable message describing the first failed rule set.
    pub fn prepare(mut self) -> Result<Self, String> {
        self.name = self.name.trim().to_string();
        self.contact = self.contact.trim().to_string();
        self.make_model = clean_optional(self.make_model);
        self.budget = clean_optional(self.budget);
        self.message = clean_optional(self.message);

        self.validate().map_err(|e| validation_message(&e))?;

        if !looks_like_contact(&self.contact) {
            return Err("contact must be an e-mail address or a phone number".to_string());
        }

        let extra = self.extra.take().unwrap_or_else(|| Value::Object(Default::default()));
        match &extra {
            Value::Object(map) if map.len() > MAX_EXTRA_KEYS => {
                return Err(format!("extra may hold at most {MAX_EXTRA_KEYS} fields"));
            }
            Value::Object(_) => {}
            _ => return Err("extra must be a JSON object".to_string()),
        }
        if extra.to_string().len() > MAX_EXTRA_BYTES {
            return Err(format!("extra must serialise to at most {MAX_EXTRA_BYTES} bytes"));
        }
        self.extra = Some(extra);

        Ok(self)
    }
}

/// An e-mail needs something on both sides of a single `@`; a phone needs seven digits.
fn looks_like_contact(contact: &str) -> bool {
    if contact.contains('@') {
        let mut parts = contact.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return false;
        };
        return !local.is_empty() && domain.contains('.') && !domain.starts_with('.');
    }

    let digits = contact.chars().filter(char::is_ascii_digit).count();
    digits >= 7
        && contact
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')' | '.'))
}

/// Admin update payload.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LeadUpdate {
    pub status: Option<LeadStatus>,

    #[validate(length(max = 5000, message = "notes must be at most 5000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<LeadStatus>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub q: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub per_page: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub q: Option<String>,
    pub pagination: Pagination,
}

impl LeadQuery {
    /// # Errors
    ///
    /// Returns a message for bad pagination.
    pub fn into_filter(self) -> Result<LeadFilter, String> {
        Ok(LeadFilter {
            status: self.status,
            q: self.q,
            pagination: Pagination::from_query(self.page, self.per_page)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input() -> LeadInput {
        LeadInput {
            name: "  Sam Carter ".to_string(),
            contact: "sam@example.com".to_string(),
            make_model: Some("BMW 3 Series".to_string()),
            budget: Some(" ".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_prepare_defaults_extra_to_object() {
        let lead = input().prepare().unwrap();
        assert_eq!(lead.name, "Sam Carter");
        assert_eq!(lead.budget, None);
        assert_eq!(lead.extra, Some(json!({})));
    }

    #[test]
    fn test_contact_formats() {
        assert!(looks_like_contact("sam@example.com"));
        assert!(looks_like_contact("+44 (0)7700 900123"));
        assert!(!looks_like_contact("sam@"));
        assert!(!looks_like_contact("a@b@c.com"));
        assert!(!looks_like_contact("12345"));
        assert!(!looks_like_contact("call me maybe"));
    }

    #[test]
    fn test_extra_must_be_small_object() {
        let mut lead = input();
        lead.extra = Some(json!(["not", "an", "object"]));
        assert!(lead.prepare().is_err());

        let mut lead = input();
        let big: serde_json::Map<String, Value> =
            (0..21).map(|i| (format!("k{i}"), json!(i))).collect();
        lead.extra = Some(Value::Object(big));
        assert!(lead.prepare().is_err());

        let mut lead = input();
        lead.extra = Some(json!({ "blob": "x".repeat(5000) }));
        assert!(lead.prepare().is_err());

        let mut lead = input();
        lead.extra = Some(json!({ "finance": true, "part_exchange": "2015 Fiesta" }));
        assert!(lead.prepare().is_ok());
    }

    #[test]
    fn test_name_required() {
        let mut lead = input();
        lead.name = "   ".to_string();
        let err = lead.prepare().unwrap_err();
        assert!(err.contains("name"), "{err}");
    }
}
