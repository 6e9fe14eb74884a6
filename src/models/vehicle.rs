use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::page::Pagination;
use super::{clean_optional, empty_as_none, validation_message};

pub const MIN_YEAR: i32 = 1950;
pub const MAX_IMAGES: usize = 30;
pub const MAX_IMAGE_URL_LEN: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Petrol,
    Diesel,
    Hybrid,
    PlugInHybrid,
    Electric,
    Other,
}

impl FuelType {
    pub const ALL: [Self; 6] = [
        Self::Petrol,
        Self::Diesel,
        Self::Hybrid,
        Self::PlugInHybrid,
        Self::Electric,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Petrol => "petrol",
            Self::Diesel => "diesel",
            Self::Hybrid => "hybrid",
            Self::PlugInHybrid => "plug_in_hybrid",
            Self::Electric => "electric",
            Self::Other => "other",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Petrol => "Petrol",
            Self::Diesel => "Diesel",
            Self::Hybrid => "Hybrid",
            Self::PlugInHybrid => "Plug-in hybrid",
            Self::Electric => "Electric",
            Self::Other => "Other",
        }
    }
}

impl FromStr for FuelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown fuel type: {s}"))
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transmission {
    Manual,
    Automatic,
}

impl Transmission {
    pub const ALL: [Self; 2] = [Self::Manual, Self::Automatic];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Automatic => "automatic",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::Automatic => "Automatic",
        }
    }
}

impl FromStr for Transmission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "automatic" => Ok(Self::Automatic),
            _ => Err(format!("unknown transmission: {s}")),
        }
    }
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    #[default]
    Draft,
    Available,
    Reserved,
    Sold,
}

impl VehicleStatus {
    pub const ALL: [Self; 4] = [Self::Draft, Self::Available, Self::Reserved, Self::Sold];

    /// Statuses shown on the public site.
    pub const PUBLIC: [Self; 3] = [Self::Available, Self::Reserved, Self::Sold];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Sold => "sold",
        }
    }

    #[must_use]
    pub const fn is_public(&self) -> bool {
        !matches!(self, Self::Draft)
    }
}

impl FromStr for VehicleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown vehicle status: {s}"))
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Vehicle {
    pub id: i32,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub mileage: i32,
    pub price: i64,
    pub fuel: FuelType,
    pub transmission: Transmission,
    pub body_type: Option<String>,
    pub colour: Option<String>,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub featured: bool,
    pub featured_position: Option<i32>,
    pub status: VehicleStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Vehicle {
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }

    #[must_use]
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Create/update payload for a vehicle.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VehicleInput {
    #[validate(length(min = 1, max = 60, message = "make must be 1-60 characters"))]
    pub make: String,

    #[validate(length(min = 1, max = 80, message = "model must be 1-80 characters"))]
    pub model: String,

    pub year: i32,

    #[validate(range(min = 0, max = 2_000_000, message = "mileage must be between 0 and 2,000,000"))]
    pub mileage: i32,

    #[validate(range(min = 0, max = 10_000_000, message = "price must be between 0 and 10,000,000"))]
    pub price: i64,

    pub fuel: FuelType,

    pub transmission: Transmission,

    #[validate(length(max = 40, message = "body_type must be at most 40 characters"))]
    pub body_type: Option<String>,

    #[validate(length(max = 40, message = "colour must be at most 40 characters"))]
    pub colour: Option<String>,

    #[validate(length(max = 5000, message = "description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(length(max = 30, message = "at most 30 images per vehicle"))]
    pub images: Vec<String>,

    #[serde(default)]
    pub featured: bool,

    #[validate(range(min = 0, max = 100, message = "featured_position must be between 0 and 100"))]
    pub featured_position: Option<i32>,

    #[serde(default)]
    pub status: VehicleStatus,
}

impl VehicleInput {
    /// Validates and normalises the payload in place.
    ///
    /// # Errors
    ///
    /// Returns a human readable message describing every failed rule.
    pub fn prepare(mut self, current_year: i32) -> Result<Self, String> {
        self.make = self.make.trim().to_string();
        self.model = self.model.trim().to_string();
        self.body_type = clean_optional(self.body_type);
        self.colour = clean_optional(self.colour);
        self.description = clean_optional(self.description);
        self.images = self
            .images
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();

        self.validate().map_err(|e| validation_message(&e))?;

        if !(MIN_YEAR..=current_year + 1).contains(&self.year) {
            return Err(format!(
                "year must be between {MIN_YEAR} and {}",
                current_year + 1
            ));
        }

        if let Some(url) = self.images.iter().find(|u| u.len() > MAX_IMAGE_URL_LEN) {
            return Err(format!(
                "image URL too long ({} characters, max {MAX_IMAGE_URL_LEN})",
                url.len()
            ));
        }

        if !self.featured {
            self.featured_position = None;
        }

        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    MileageAsc,
    YearDesc,
}

impl VehicleSort {
    pub const ALL: [Self; 5] = [
        Self::Newest,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::MileageAsc,
        Self::YearDesc,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::MileageAsc => "mileage_asc",
            Self::YearDesc => "year_desc",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Newest => "Newest first",
            Self::PriceAsc => "Price: low to high",
            Self::PriceDesc => "Price: high to low",
            Self::MileageAsc => "Lowest mileage",
            Self::YearDesc => "Newest year",
        }
    }
}

impl FromStr for VehicleSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown sort: {s}"))
    }
}

/// Query-string filter shared by the stock page and the listing API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub make: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub q: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub fuel: Option<FuelType>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub transmission: Option<Transmission>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_price: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_price: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_year: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_year: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_mileage: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<VehicleStatus>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort: Option<VehicleSort>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub per_page: Option<u64>,
}

/// Validated filter passed down to the repository.
#[derive(Debug, Clone, Default)]
pub struct VehicleFilter {
    pub make: Option<String>,
    pub q: Option<String>,
    pub fuel: Option<FuelType>,
    pub transmission: Option<Transmission>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub max_mileage: Option<i32>,
    /// `None` with `public_only` lists every public status.
    pub statuses: Option<Vec<VehicleStatus>>,
    pub sort: VehicleSort,
    pub pagination: Pagination,
}

impl VehicleQuery {
    /// Converts the raw query into a filter. Public callers never see drafts.
    ///
    /// # Errors
    ///
    /// Returns a message for inverted ranges or bad pagination.
    pub fn into_filter(self, public_only: bool) -> Result<VehicleFilter, String> {
        if let (Some(min), Some(max)) = (self.min_price, self.max_price)
            && min > max
        {
            return Err("min_price cannot exceed max_price".to_string());
        }
        if let (Some(min), Some(max)) = (self.min_year, self.max_year)
            && min > max
        {
            return Err("min_year cannot exceed max_year".to_string());
        }

        let pagination = Pagination::from_query(self.page, self.per_page)?;

        let statuses = match (public_only, self.status) {
            (true, Some(status)) if !status.is_public() => Some(Vec::new()),
            (_, Some(status)) => Some(vec![status]),
            (true, None) => Some(VehicleStatus::PUBLIC.to_vec()),
            (false, None) => None,
        };

        Ok(VehicleFilter {
            make: self.make,
            q: self.q,
            fuel: self.fuel,
            transmission: self.transmission,
            min_price: self.min_price,
            max_price: self.max_price,
            min_year: self.min_year,
            max_year: self.max_year,
            max_mileage: self.max_mileage,
            statuses,
            sort: self.sort.unwrap_or_default(),
            pagination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> VehicleInput {
        VehicleInput {
            make: " Volkswagen ".to_string(),
            model: "Golf GTI".to_string(),
            year: 2021,
            mileage: 18_500,
            price: 27_995,
            fuel: FuelType::Petrol,
            transmission: Transmission::Automatic,
            body_type: Some("Hatchback".to_string()),
            colour: Some("  ".to_string()),
            description: None,
            images: vec![" https://cdn.example/a.jpg ".to_string(), String::new()],
            featured: false,
            featured_position: Some(3),
            status: VehicleStatus::Available,
        }
    }

    #[test]
    fn test_prepare_normalises_fields() {
        let prepared = input().prepare(2026).unwrap();
        assert_eq!(prepared.make, "Volkswagen");
        assert_eq!(prepared.colour, None);
        assert_eq!(prepared.images, vec!["https://cdn.example/a.jpg".to_string()]);
        // position only means something for featured vehicles
        assert_eq!(prepared.featured_position, None);
    }

    #[test]
    fn test_prepare_rejects_bad_year() {
        let mut v = input();
        v.year = 2028;
        assert!(v.prepare(2026).is_err());

        let mut v = input();
        v.year = 1949;
        assert!(v.prepare(2026).is_err());

        let mut v = input();
        v.year = 2027;
        assert!(v.prepare(2026).is_ok());
    }

    #[test]
    fn test_prepare_rejects_schema_violations() {
        let mut v = input();
        v.make = "   ".to_string();
        let err = v.prepare(2026).unwrap_err();
        assert!(err.contains("make"), "{err}");

        let mut v = input();
        v.price = -1;
        assert!(v.prepare(2026).is_err());

        let mut v = input();
        v.images = vec!["https://cdn.example/x.jpg".to_string(); 31];
        assert!(v.prepare(2026).is_err());
    }

    #[test]
    fn test_query_hides_drafts_from_public() {
        let filter = VehicleQuery::default().into_filter(true).unwrap();
        assert_eq!(filter.statuses, Some(VehicleStatus::PUBLIC.to_vec()));

        let query = VehicleQuery {
            status: Some(VehicleStatus::Draft),
            ..Default::default()
        };
        assert_eq!(query.clone().into_filter(true).unwrap().statuses, Some(vec![]));
        assert_eq!(
            query.into_filter(false).unwrap().statuses,
            Some(vec![VehicleStatus::Draft])
        );

        assert_eq!(VehicleQuery::default().into_filter(false).unwrap().statuses, None);
    }

    #[test]
    fn test_query_rejects_inverted_ranges() {
        let query = VehicleQuery {
            min_price: Some(20_000),
            max_price: Some(10_000),
            ..Default::default()
        };
        assert!(query.into_filter(true).is_err());
    }

    #[test]
    fn test_enum_round_trip_strings() {
        for fuel in FuelType::ALL {
            assert_eq!(fuel.as_str().parse::<FuelType>().unwrap(), fuel);
        }
        assert_eq!("sold".parse::<VehicleStatus>().unwrap(), VehicleStatus::Sold);
        assert!("manualish".parse::<Transmission>().is_err());
    }
}
