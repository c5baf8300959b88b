//! Recommendation reasons.
//!
//! Converts the features the scorer looked at into a short sentence telling
//! the user why a restaurant was recommended. The text is advisory and is
//! never fed back into ranking.

use dishrank_features::cuisine_overlap;
use dishrank_model::{Restaurant, ScoredRestaurant, UserQuery};
use serde::{Deserialize, Serialize};

pub const HIGHLY_RATED_MIN: f64 = 4.5;
pub const BUDGET_MAX_COST: u32 = 35;
pub const NEARBY_MAX_KM: f64 = 2.0;

/// Sentence used when no specific reason applies.
pub const GENERIC_REASON: &str = "This restaurant fits your overall preferences and criteria.";

/// One reason a restaurant was recommended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum Reason {
    HighlyRated,

    /// Selected cuisines the restaurant serves, in menu order
    CuisineMatch { cuisines: Vec<String> },

    BudgetFriendly,

    Nearby,
}

impl Reason {
    /// Phrase used inside the reason sentence.
    pub fn phrase(&self) -> String {
        match self {
            Self::HighlyRated => "highly rated".to_string(),
            Self::CuisineMatch { cuisines } => {
                format!("matches your preference for {} cuisine", cuisines.join(", "))
            }
            Self::BudgetFriendly => "budget-friendly".to_string(),
            Self::Nearby => "nearby location".to_string(),
        }
    }
}

/// Applicable reasons for a restaurant, in fixed order.
pub fn reasons(restaurant: &Restaurant, query: &UserQuery) -> Vec<Reason> {
    let mut reasons = Vec::new();

    if restaurant.rating >= HIGHLY_RATED_MIN {
        reasons.push(Reason::HighlyRated);
    }

    let matching = cuisine_overlap(&restaurant.cuisines, &query.selected_cuisines);
    if !matching.is_empty() {
        reasons.push(Reason::CuisineMatch {
            cuisines: matching.into_iter().map(String::from).collect(),
        });
    }

    if restaurant.cost_for_two <= BUDGET_MAX_COST {
        reasons.push(Reason::BudgetFriendly);
    }

    if restaurant.distance_km.is_some_and(|d| d <= NEARBY_MAX_KM) {
        reasons.push(Reason::Nearby);
    }

    reasons
}

/// Render reasons as the sentence shown with a result.
pub fn sentence(reasons: &[Reason]) -> String {
    if reasons.is_empty() {
        return GENERIC_REASON.to_string();
    }

    let phrases: Vec<_> = reasons.iter().map(Reason::phrase).collect();
    format!("This restaurant is {}.", phrases.join(", "))
}

/// Reason text for one scored result.
pub fn explain(scored: &ScoredRestaurant<'_>, query: &UserQuery) -> String {
    sentence(&reasons(scored.restaurant, query))
}
