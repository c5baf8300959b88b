//! Recommendation pipeline.
//!
//! Wires the other crates together:
//!
//! ```text
//! Catalog::new (distances) -> filter -> score -> rank -> (reasons, analytics)
//! ```
//!
//! Every request is a plain synchronous call over an immutable catalog. The
//! only write to restaurant records is the distance pass in [`load_catalog`],
//! and [`Catalog`] guarantees it has happened before any query runs.

use dishrank_analytics::{summarize, AnalyticsSummary};
use dishrank_explain::{reasons, sentence, Reason};
use dishrank_features::haversine_km;
use dishrank_model::{GeoPoint, Restaurant, ScoredRestaurant, SortKey, UserQuery};
use dishrank_query::{sanitize, CatalogFilter, NEARBY_RADIUS_KM};
use dishrank_rerank::{rank, score_candidates, ScoreWeights};
use serde::Serialize;
use tracing::{debug, info, warn};

pub use dishrank_explain::explain;

/// Engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of ranked results materialised with reasons
    pub top_n: usize,
    /// Radius used by nearby mode, in km
    pub nearby_radius_km: f64,
    /// Similarity feature weights
    pub weights: ScoreWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_n: 12,
            nearby_radius_km: NEARBY_RADIUS_KM,
            weights: ScoreWeights::default(),
        }
    }
}

/// Fill in `distance_km` on every record relative to `origin`.
///
/// Calling it again simply recomputes the distances.
pub fn load_catalog(restaurants: &mut [Restaurant], origin: GeoPoint) {
    for r in restaurants.iter_mut() {
        r.distance_km = Some(haversine_km(origin, r.position()));
    }
    debug!(
        restaurants = restaurants.len(),
        latitude = origin.latitude,
        longitude = origin.longitude,
        "distances computed"
    );
}

/// A restaurant catalog whose distances are known.
#[derive(Debug, Clone)]
pub struct Catalog {
    restaurants: Vec<Restaurant>,
    origin: GeoPoint,
}

impl Catalog {
    pub fn new(mut restaurants: Vec<Restaurant>, origin: GeoPoint) -> Self {
        load_catalog(&mut restaurants, origin);
        Self {
            restaurants,
            origin,
        }
    }

    /// Move the user and recompute every distance.
    pub fn relocate(&mut self, origin: GeoPoint) {
        load_catalog(&mut self.restaurants, origin);
        self.origin = origin;
    }

    pub fn restaurants(&self) -> &[Restaurant] {
        &self.restaurants
    }

    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }

    /// Distinct cuisines in first-seen order.
    pub fn cuisines(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for cuisine in self.restaurants.iter().flat_map(|r| &r.cuisines) {
            if !seen.contains(&cuisine.as_str()) {
                seen.push(cuisine);
            }
        }
        seen
    }

    pub fn recommend(&self, query: &UserQuery, config: &EngineConfig) -> Recommendation<'_> {
        recommend(&self.restaurants, query, config)
    }
}

/// A ranked result with its explanation.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedRestaurant<'a> {
    #[serde(flatten)]
    pub scored: ScoredRestaurant<'a>,
    pub reasons: Vec<Reason>,
    /// Sentence form of `reasons`
    pub reason: String,
}

/// Output of a request that matched at least one restaurant.
#[derive(Debug, Clone, Serialize)]
pub struct RankedResult<'a> {
    /// Top results in rank order
    pub results: Vec<RecommendedRestaurant<'a>>,
    /// Number of candidates before truncation
    pub total_matches: usize,
    pub sort_key: SortKey,
    /// Statistics over every candidate, not just the top results
    pub analytics: AnalyticsSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Recommendation<'a> {
    Ranked(RankedResult<'a>),
    /// No restaurant satisfied the query's constraints
    Empty,
}

impl<'a> Recommendation<'a> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn ranked(&self) -> Option<&RankedResult<'a>> {
        match self {
            Self::Ranked(ranked) => Some(ranked),
            Self::Empty => None,
        }
    }
}

/// Run one recommendation request.
pub fn recommend<'a>(
    restaurants: &'a [Restaurant],
    query: &UserQuery,
    config: &EngineConfig,
) -> Recommendation<'a> {
    let query = sanitize(query);

    if query.nearby_only && restaurants.iter().any(|r| r.distance_km.is_none()) {
        warn!("nearby mode requested on a catalog without distances; unlocated restaurants are excluded");
    }

    let candidates = CatalogFilter::from_query(&query, config.nearby_radius_km).apply(restaurants);
    if candidates.is_empty() {
        info!(catalog = restaurants.len(), "no restaurants match the query");
        return Recommendation::Empty;
    }

    let scored = score_candidates(candidates, &query, &config.weights);
    let ranked = rank(scored, query.sort_key);
    let analytics = summarize(&ranked);
    let total_matches = ranked.len();

    let results: Vec<RecommendedRestaurant<'a>> = ranked
        .into_iter()
        .take(config.top_n)
        .map(|scored| {
            let reasons = reasons(scored.restaurant, &query);
            RecommendedRestaurant {
                reason: sentence(&reasons),
                reasons,
                scored,
            }
        })
        .collect();

    info!(
        catalog = restaurants.len(),
        matches = total_matches,
        returned = results.len(),
        sort = %query.sort_key,
        "recommendation complete"
    );

    Recommendation::Ranked(RankedResult {
        results,
        total_matches,
        sort_key: query.sort_key,
        analytics,
    })
}
