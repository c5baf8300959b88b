//! Catalog filtering.
//!
//! Turns a `UserQuery` into a pipeline of hard constraints and reduces the
//! catalog to the candidates that satisfy every one of them. Candidate order
//! always follows catalog order.

use dishrank_features::contains_ci;
use dishrank_model::{Restaurant, UserQuery, VegFilter};
use tracing::{debug, trace};

/// Radius used by nearby mode, in km.
pub const NEARBY_RADIUS_KM: f64 = 5.0;

/// A single hard constraint on catalog records.
pub trait Constraint {
    /// Short name used in logs and rejection reports
    fn name(&self) -> &'static str;

    /// Whether the restaurant satisfies this constraint
    fn admits(&self, restaurant: &Restaurant) -> bool;
}

#[derive(Debug)]
pub struct MinRating(pub f64);

impl Constraint for MinRating {
    fn name(&self) -> &'static str {
        "min_rating"
    }

    fn admits(&self, restaurant: &Restaurant) -> bool {
        restaurant.rating >= self.0
    }
}

#[derive(Debug)]
pub struct MaxCost(pub u32);

impl Constraint for MaxCost {
    fn name(&self) -> &'static str {
        "max_cost"
    }

    fn admits(&self, restaurant: &Restaurant) -> bool {
        restaurant.cost_for_two <= self.0
    }
}

#[derive(Debug)]
pub struct LocationContains(pub String);

impl Constraint for LocationContains {
    fn name(&self) -> &'static str {
        "location"
    }

    fn admits(&self, restaurant: &Restaurant) -> bool {
        contains_ci(&restaurant.location, &self.0)
    }
}

#[derive(Debug)]
pub struct Diet(pub VegFilter);

impl Constraint for Diet {
    fn name(&self) -> &'static str {
        "veg_filter"
    }

    fn admits(&self, restaurant: &Restaurant) -> bool {
        self.0.admits(restaurant.veg)
    }
}

#[derive(Debug)]
pub struct OffersDelivery;

impl Constraint for OffersDelivery {
    fn name(&self) -> &'static str {
        "delivery"
    }

    fn admits(&self, restaurant: &Restaurant) -> bool {
        restaurant.delivery
    }
}

#[derive(Debug)]
pub struct TakesBookings;

impl Constraint for TakesBookings {
    fn name(&self) -> &'static str {
        "table_booking"
    }

    fn admits(&self, restaurant: &Restaurant) -> bool {
        restaurant.table_booking
    }
}

/// Distance cap. Records without a usable distance never pass.
#[derive(Debug)]
pub struct WithinRadius(pub f64);

impl Constraint for WithinRadius {
    fn name(&self) -> &'static str {
        "nearby"
    }

    fn admits(&self, restaurant: &Restaurant) -> bool {
        restaurant.distance_km.is_some_and(|d| d <= self.0)
    }
}

/// The constraint pipeline for one query.
pub struct CatalogFilter {
    constraints: Vec<Box<dyn Constraint>>,
}

impl CatalogFilter {
    /// Build the pipeline for `query`. Inactive options add no constraint.
    pub fn from_query(query: &UserQuery, nearby_radius_km: f64) -> Self {
        let mut constraints: Vec<Box<dyn Constraint>> = vec![
            Box::new(MinRating(query.min_rating)),
            Box::new(MaxCost(query.max_cost)),
        ];

        if !query.location_substring.is_empty() {
            constraints.push(Box::new(LocationContains(query.location_substring.clone())));
        }
        if query.veg_filter != VegFilter::Any {
            constraints.push(Box::new(Diet(query.veg_filter)));
        }
        if query.require_delivery {
            constraints.push(Box::new(OffersDelivery));
        }
        if query.require_booking {
            constraints.push(Box::new(TakesBookings));
        }
        if query.nearby_only {
            constraints.push(Box::new(WithinRadius(nearby_radius_km)));
        }

        Self { constraints }
    }

    /// Name of the first constraint the restaurant fails, if any.
    pub fn rejection(&self, restaurant: &Restaurant) -> Option<&'static str> {
        self.constraints
            .iter()
            .find(|c| !c.admits(restaurant))
            .map(|c| c.name())
    }

    /// Keep the admitted restaurants, in catalog order.
    pub fn apply<'a>(&self, catalog: &'a [Restaurant]) -> Vec<&'a Restaurant> {
        catalog
            .iter()
            .filter(|r| match self.rejection(r) {
                Some(constraint) => {
                    trace!(id = r.id, constraint, "restaurant excluded");
                    false
                }
                None => true,
            })
            .collect()
    }
}

/// Filter `catalog` with the default nearby radius.
pub fn filter_catalog<'a>(catalog: &'a [Restaurant], query: &UserQuery) -> Vec<&'a Restaurant> {
    CatalogFilter::from_query(query, NEARBY_RADIUS_KM).apply(catalog)
}

/// Clamp out-of-range query values to their nearest bound.
///
/// `min_rating` is forced into 0-5 and a NaN becomes 0. Repeated cuisine
/// selections are collapsed to one. This never fails.
pub fn sanitize(query: &UserQuery) -> UserQuery {
    let mut query = query.clone();

    if query.dedup_cuisines() {
        debug!(cuisines = ?query.selected_cuisines, "dropped repeated cuisine selections");
    }

    let clamped = if query.min_rating.is_nan() {
        0.0
    } else {
        query.min_rating.clamp(0.0, 5.0)
    };
    if clamped != query.min_rating || query.min_rating.is_nan() {
        debug!(requested = query.min_rating, clamped, "min_rating out of range");
        query.min_rating = clamped;
    }

    query
}
