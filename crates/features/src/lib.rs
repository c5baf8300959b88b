//! Feature extraction for restaurant scoring.
//!
//! Provides pure functions shared by filtering, scoring and explanation:
//! - Great-circle distance (haversine)
//! - Case-insensitive text containment
//! - Cuisine overlap between a restaurant and a query

use dishrank_model::GeoPoint;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in km, rounded to one decimal.
///
/// Non-finite inputs produce NaN rather than a panic.
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
            * to.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` past 1 for near-antipodal points. NaN must survive.
    let a = if a > 1.0 { 1.0 } else { a };
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    round_to_tenth(EARTH_RADIUS_KM * c)
}

/// Round to one decimal place, halves away from zero.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Case-insensitive substring test. An empty needle always matches.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Restaurant cuisines that appear in `selected`, in the restaurant's order.
pub fn cuisine_overlap<'a>(cuisines: &'a [String], selected: &[String]) -> Vec<&'a str> {
    cuisines
        .iter()
        .filter(|c| selected.contains(c))
        .map(String::as_str)
        .collect()
}

/// Number of `terms` mentioned anywhere in `text`, ignoring case.
pub fn count_mentions(text: &str, terms: &[String]) -> usize {
    let text = text.to_lowercase();
    terms
        .iter()
        .filter(|t| text.contains(&t.to_lowercase()))
        .count()
}
