pub mod lead;
pub mod page;
pub mod settings;
pub mod testimonial;
pub mod vehicle;

use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;
use validator::ValidationErrors;

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

/// HTML forms submit unselected inputs as `field=`; treat those as absent.
/// JSON bodies may send the same fields as bare numbers.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = match Option::<Scalar>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(Scalar::Text(text)) => text,
        Some(Scalar::Number(number)) => number.to_string(),
    };
    match raw.trim() {
        "" => Ok(None),
        value => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Flattens validator output into a single line suitable for an error message.
#[must_use]
pub fn validation_message(errors: &ValidationErrors) -> String {
    errors
        .to_string()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Trims an optional text field, mapping blank input to `None`.
#[must_use]
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::FuelType;

    #[derive(Deserialize)]
    struct Query {
        #[serde(default, deserialize_with = "empty_as_none")]
        fuel: Option<FuelType>,
        #[serde(default, deserialize_with = "empty_as_none")]
        max_price: Option<i64>,
    }

    #[test]
    fn test_empty_as_none() {
        let q: Query = serde_json::from_str(r#"{"fuel": "", "max_price": " 15000 "}"#).unwrap();
        assert!(q.fuel.is_none());
        assert_eq!(q.max_price, Some(15000));

        let q: Query = serde_json::from_str(r#"{"fuel": "diesel"}"#).unwrap();
        assert_eq!(q.fuel, Some(FuelType::Diesel));
        assert!(q.max_price.is_none());

        assert!(serde_json::from_str::<Query>(r#"{"fuel": "steam"}"#).is_err());

        let q: Query = serde_json::from_str(r#"{"max_price": 9500}"#).unwrap();
        assert_eq!(q.max_price, Some(9500));
    }

    #[test]
    fn test_clean_optional() {
        assert_eq!(clean_optional(Some("  Blue ".to_string())), Some("Blue".to_string()));
        assert_eq!(clean_optional(Some("   ".to_string())), None);
        assert_eq!(clean_optional(None), None);
    }
}
