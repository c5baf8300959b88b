//! Similarity scoring and ranking for restaurant candidates.
//!
//! Takes the filtered candidates, blends four content features into a
//! 0-100 match score and orders the result by the requested key.

use std::cmp::Ordering;
use std::collections::HashSet;

use dishrank_features::{count_mentions, cuisine_overlap};
use dishrank_model::{Restaurant, ScoredRestaurant, SortKey, UserQuery};

/// Share of a weight granted when the query expresses no cuisine preference.
pub const NO_PREFERENCE_CREDIT: f64 = 0.5;

/// Feature weights for the similarity score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    /// Weight for cuisine coverage of the selection
    pub cuisine: f64,
    /// Weight for the normalised rating
    pub rating: f64,
    /// Weight for affordability
    pub cost: f64,
    /// Weight for selected cuisines mentioned in reviews
    pub reviews: f64,
    /// Cost at or above which affordability is zero
    pub cost_ceiling: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            cuisine: 0.40,
            rating: 0.25,
            cost: 0.20,
            reviews: 0.15,
            cost_ceiling: 200.0,
        }
    }
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.cuisine + self.rating + self.cost + self.reviews
    }
}

/// Weighted contribution of each feature, before normalisation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub cuisine: f64,
    pub rating: f64,
    pub cost: f64,
    pub reviews: f64,
}

impl ScoreBreakdown {
    pub fn compute(restaurant: &Restaurant, query: &UserQuery, weights: &ScoreWeights) -> Self {
        // The selection is a set; a repeated cuisine must not shrink coverage.
        let mut seen = HashSet::with_capacity(query.selected_cuisines.len());
        let selected: Vec<String> = query
            .selected_cuisines
            .iter()
            .filter(|c| seen.insert(c.as_str()))
            .cloned()
            .collect();

        // Coverage is measured against the selection, not the restaurant's menu.
        let (cuisine, reviews) = if selected.is_empty() {
            (
                weights.cuisine * NO_PREFERENCE_CREDIT,
                weights.reviews * NO_PREFERENCE_CREDIT,
            )
        } else {
            let wanted = selected.len() as f64;
            let served = cuisine_overlap(&restaurant.cuisines, &selected).len() as f64;
            let mentioned = count_mentions(&restaurant.reviews, &selected) as f64;
            (
                weights.cuisine * served / wanted,
                weights.reviews * mentioned / wanted,
            )
        };

        let affordability = if weights.cost_ceiling > 0.0 {
            (1.0 - f64::from(restaurant.cost_for_two) / weights.cost_ceiling).max(0.0)
        } else {
            0.0
        };

        Self {
            cuisine,
            rating: weights.rating * restaurant.rating / 5.0,
            cost: weights.cost * affordability,
            reviews,
        }
    }

    pub fn total(&self) -> f64 {
        self.cuisine + self.rating + self.cost + self.reviews
    }

    /// Normalise by the applied weights and convert to an integer percentage.
    pub fn percent(&self, weights: &ScoreWeights) -> u8 {
        let applied = weights.total();
        if applied <= 0.0 {
            return 0;
        }
        // NaN saturates to 0 in the cast.
        (self.total() / applied * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Match score for one restaurant, 0 - 100.
pub fn similarity(restaurant: &Restaurant, query: &UserQuery, weights: &ScoreWeights) -> u8 {
    ScoreBreakdown::compute(restaurant, query, weights).percent(weights)
}

/// Score every candidate, keeping candidate order.
pub fn score_candidates<'a, I>(
    candidates: I,
    query: &UserQuery,
    weights: &ScoreWeights,
) -> Vec<ScoredRestaurant<'a>>
where
    I: IntoIterator<Item = &'a Restaurant>,
{
    candidates
        .into_iter()
        .map(|restaurant| ScoredRestaurant {
            restaurant,
            similarity: similarity(restaurant, query, weights),
        })
        .collect()
}

/// Order scored candidates by `key`.
///
/// The sort is stable: equal keys keep their incoming order. Missing or NaN
/// values sort last for both float keys.
pub fn rank<'a>(mut scored: Vec<ScoredRestaurant<'a>>, key: SortKey) -> Vec<ScoredRestaurant<'a>> {
    match key {
        SortKey::Rating => scored.sort_by(|a, b| {
            descending_nan_last(a.restaurant.rating, b.restaurant.rating)
        }),
        SortKey::Cost => {
            scored.sort_by(|a, b| a.restaurant.cost_for_two.cmp(&b.restaurant.cost_for_two))
        }
        SortKey::Distance => scored.sort_by(|a, b| {
            ascending_nan_last(distance_or_nan(a.restaurant), distance_or_nan(b.restaurant))
        }),
        SortKey::Similarity => scored.sort_by(|a, b| b.similarity.cmp(&a.similarity)),
    }
    scored
}

fn distance_or_nan(restaurant: &Restaurant) -> f64 {
    restaurant.distance_km.unwrap_or(f64::NAN)
}

fn ascending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
