//! Core domain model for dishrank restaurant recommendations.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `Restaurant`: An immutable catalog record plus its cached distance
//! - `UserQuery`: Hard constraints and preferences for one request
//! - `VegFilter` / `SortKey`: Query enums with their form string forms
//! - `ScoredRestaurant`: A candidate with its similarity score
//! - `CatalogError`: Problems found by caller-side catalog validation

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside the valid degree ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A restaurant in the catalog.
///
/// Everything except `distance_km` is fixed once the catalog is read.
/// `distance_km` is filled in when the catalog is loaded against a user
/// location and stays `None` until then.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Catalog identifier
    pub id: u32,

    pub name: String,

    /// Free-text area name (e.g. "Downtown")
    #[serde(default)]
    pub location: String,

    pub latitude: f64,
    pub longitude: f64,

    /// Average rating, 0.0 - 5.0
    pub rating: f64,

    /// Typical price of a meal for two
    pub cost_for_two: u32,

    /// Cuisine tags in display order
    pub cuisines: Vec<String>,

    #[serde(default)]
    pub veg: bool,

    #[serde(default)]
    pub delivery: bool,

    #[serde(default)]
    pub table_booking: bool,

    /// Free-text review snippets
    #[serde(default)]
    pub reviews: String,

    #[serde(default)]
    pub image_url: String,

    /// Distance from the user location in km, one decimal place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl Restaurant {
    /// Create a minimal record for testing.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            location: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            rating: 0.0,
            cost_for_two: 0,
            cuisines: Vec::new(),
            veg: false,
            delivery: false,
            table_booking: false,
            reviews: String::new(),
            image_url: String::new(),
            distance_km: None,
        }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn serves(&self, cuisine: &str) -> bool {
        self.cuisines.iter().any(|c| c == cuisine)
    }
}

/// Error returned when a query enum is parsed from an unknown string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Vegetarian constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VegFilter {
    /// No constraint
    #[default]
    Any,
    /// Vegetarian restaurants only
    #[serde(rename = "veg")]
    VegOnly,
    /// Non-vegetarian restaurants only
    #[serde(rename = "nonveg")]
    NonVegOnly,
}

impl VegFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::VegOnly => "veg",
            Self::NonVegOnly => "nonveg",
        }
    }

    pub fn admits(&self, veg: bool) -> bool {
        match self {
            Self::Any => true,
            Self::VegOnly => veg,
            Self::NonVegOnly => !veg,
        }
    }
}

impl FromStr for VegFilter {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "any" | "" => Ok(Self::Any),
            "veg" => Ok(Self::VegOnly),
            "nonveg" | "non-veg" => Ok(Self::NonVegOnly),
            _ => Err(ParseEnumError {
                kind: "veg filter",
                value: s.to_string(),
                expected: "any, veg, nonveg",
            }),
        }
    }
}

impl fmt::Display for VegFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering applied to the scored candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Similarity score, highest first
    #[default]
    Similarity,
    /// Rating, highest first
    Rating,
    /// Cost for two, cheapest first
    Cost,
    /// Distance, closest first
    Distance,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Similarity => "similarity",
            Self::Rating => "rating",
            Self::Cost => "cost",
            Self::Distance => "distance",
        }
    }
}

impl FromStr for SortKey {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "similarity" | "" => Ok(Self::Similarity),
            "rating" => Ok(Self::Rating),
            "cost" => Ok(Self::Cost),
            "distance" => Ok(Self::Distance),
            _ => Err(ParseEnumError {
                kind: "sort key",
                value: s.to_string(),
                expected: "similarity, rating, cost, distance",
            }),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraints and preferences for one recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserQuery {
    /// Preferred cuisines, no repeats; empty means no preference
    #[serde(default)]
    pub selected_cuisines: Vec<String>,

    /// Case-insensitive fragment of the restaurant's area name
    #[serde(default)]
    pub location_substring: String,

    /// Minimum rating, 0 - 5
    #[serde(default)]
    pub min_rating: f64,

    /// Maximum cost for two
    #[serde(default = "default_max_cost")]
    pub max_cost: u32,

    #[serde(default)]
    pub veg_filter: VegFilter,

    #[serde(default)]
    pub require_delivery: bool,

    #[serde(default)]
    pub require_booking: bool,

    /// Restrict to restaurants within the nearby radius
    #[serde(default)]
    pub nearby_only: bool,

    #[serde(default)]
    pub sort_key: SortKey,
}

fn default_max_cost() -> u32 {
    200
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            selected_cuisines: Vec::new(),
            location_substring: String::new(),
            min_rating: 0.0,
            max_cost: default_max_cost(),
            veg_filter: VegFilter::Any,
            require_delivery: false,
            require_booking: false,
            nearby_only: false,
            sort_key: SortKey::Similarity,
        }
    }
}

impl UserQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cuisines<I, S>(mut self, cuisines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_cuisines = cuisines.into_iter().map(Into::into).collect();
        self.dedup_cuisines();
        self
    }

    /// Drop repeated selections, keeping the first occurrence of each.
    ///
    /// Returns whether anything was removed.
    pub fn dedup_cuisines(&mut self) -> bool {
        let before = self.selected_cuisines.len();
        let mut seen = HashSet::with_capacity(before);
        self.selected_cuisines.retain(|c| seen.insert(c.clone()));
        self.selected_cuisines.len() != before
    }

    pub fn with_location(mut self, fragment: impl Into<String>) -> Self {
        self.location_substring = fragment.into();
        self
    }

    pub fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = min_rating;
        self
    }

    pub fn with_max_cost(mut self, max_cost: u32) -> Self {
        self.max_cost = max_cost;
        self
    }

    pub fn with_veg_filter(mut self, veg_filter: VegFilter) -> Self {
        self.veg_filter = veg_filter;
        self
    }

    pub fn with_delivery(mut self, required: bool) -> Self {
        self.require_delivery = required;
        self
    }

    pub fn with_booking(mut self, required: bool) -> Self {
        self.require_booking = required;
        self
    }

    pub fn with_nearby_only(mut self, nearby_only: bool) -> Self {
        self.nearby_only = nearby_only;
        self
    }

    pub fn with_sort_key(mut self, sort_key: SortKey) -> Self {
        self.sort_key = sort_key;
        self
    }

    pub fn has_cuisine_preference(&self) -> bool {
        !self.selected_cuisines.is_empty()
    }

    pub fn prefers(&self, cuisine: &str) -> bool {
        self.selected_cuisines.iter().any(|c| c == cuisine)
    }
}

/// A candidate restaurant with its similarity score for one query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredRestaurant<'a> {
    pub restaurant: &'a Restaurant,

    /// Match score, 0 - 100
    pub similarity: u8,
}

/// Problems found when validating a catalog before it is loaded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("restaurant {id} has rating {rating} outside 0-5")]
    RatingOutOfRange { id: u32, rating: f64 },

    #[error("restaurant {id} has no cuisines")]
    NoCuisines { id: u32 },

    #[error("restaurant {id} has invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates {
        id: u32,
        latitude: f64,
        longitude: f64,
    },

    #[error("duplicate restaurant id {0}")]
    DuplicateId(u32),
}

/// Check the record-level invariants the engine relies on.
///
/// The engine itself never rejects a catalog; callers run this before
/// loading data they did not produce themselves.
pub fn validate_catalog(restaurants: &[Restaurant]) -> Result<(), CatalogError> {
    let mut seen = HashSet::with_capacity(restaurants.len());

    for r in restaurants {
        if !seen.insert(r.id) {
            return Err(CatalogError::DuplicateId(r.id));
        }
        if !(0.0..=5.0).contains(&r.rating) {
            return Err(CatalogError::RatingOutOfRange {
                id: r.id,
                rating: r.rating,
            });
        }
        if r.cuisines.is_empty() {
            return Err(CatalogError::NoCuisines { id: r.id });
        }
        if !r.position().is_valid() {
            return Err(CatalogError::InvalidCoordinates {
                id: r.id,
                latitude: r.latitude,
                longitude: r.longitude,
            });
        }
    }

    Ok(())
}
