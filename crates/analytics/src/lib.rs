//! Aggregate statistics over a recommendation result set.
//!
//! Everything here is a pure reduction over the scored candidates of one
//! query: cuisine frequencies, cost and rating histograms, and the mean
//! rating per cuisine. Nothing is cached between queries.

use std::cmp::Ordering;
use std::collections::HashMap;

use dishrank_model::{Restaurant, ScoredRestaurant};
use serde::Serialize;

/// Number of cuisines kept in `cuisine_counts`.
pub const TOP_CUISINES: usize = 8;

/// Number of cuisines kept in `top_cuisine_avg_ratings`.
pub const TOP_RATED_CUISINES: usize = 6;

/// Cost-for-two histogram bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CostBand {
    UpTo25,
    From26To40,
    From41To60,
    Over60,
}

impl CostBand {
    pub const ALL: [CostBand; 4] = [Self::UpTo25, Self::From26To40, Self::From41To60, Self::Over60];

    pub fn of(cost_for_two: u32) -> Self {
        match cost_for_two {
            0..=25 => Self::UpTo25,
            26..=40 => Self::From26To40,
            41..=60 => Self::From41To60,
            _ => Self::Over60,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::UpTo25 => "$0-$25",
            Self::From26To40 => "$26-$40",
            Self::From41To60 => "$41-$60",
            Self::Over60 => "$61+",
        }
    }
}

/// Rating histogram bands. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RatingBand {
    Below2,
    From2,
    From3,
    From4,
    From4_5,
}

impl RatingBand {
    pub const ALL: [RatingBand; 5] = [
        Self::Below2,
        Self::From2,
        Self::From3,
        Self::From4,
        Self::From4_5,
    ];

    /// Band for a rating. Anything that is not below 4.5, NaN included,
    /// lands in the top band.
    pub fn of(rating: f64) -> Self {
        if rating < 2.0 {
            Self::Below2
        } else if rating < 3.0 {
            Self::From2
        } else if rating < 4.0 {
            Self::From3
        } else if rating < 4.5 {
            Self::From4
        } else {
            Self::From4_5
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Below2 => "0-2",
            Self::From2 => "2-3",
            Self::From3 => "3-4",
            Self::From4 => "4-4.5",
            Self::From4_5 => "4.5-5",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandCount<B> {
    pub band: B,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CuisineCount {
    pub cuisine: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CuisineRating {
    pub cuisine: String,
    pub average_rating: f64,
    /// Number of results serving this cuisine
    pub restaurants: usize,
}

/// Distribution data for one result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    /// Most frequent cuisines, descending
    pub cuisine_counts: Vec<CuisineCount>,
    pub cost_band_counts: Vec<BandCount<CostBand>>,
    pub rating_band_counts: Vec<BandCount<RatingBand>>,
    /// Cuisines with the best mean rating, descending
    pub top_cuisine_avg_ratings: Vec<CuisineRating>,
}

/// Compute every statistic over the scored result set.
pub fn summarize(scored: &[ScoredRestaurant<'_>]) -> AnalyticsSummary {
    let restaurants: Vec<&Restaurant> = scored.iter().map(|s| s.restaurant).collect();
    let tallies = tally_cuisines(&restaurants);

    AnalyticsSummary {
        cuisine_counts: cuisine_counts(&tallies),
        cost_band_counts: cost_bands(&restaurants),
        rating_band_counts: rating_bands(&restaurants),
        top_cuisine_avg_ratings: top_rated_cuisines(&tallies),
    }
}

/// Per-cuisine tally in first-seen order.
struct Tally<'a> {
    cuisine: &'a str,
    count: usize,
    rating_sum: f64,
}

fn tally_cuisines<'a>(restaurants: &[&'a Restaurant]) -> Vec<Tally<'a>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut tallies: Vec<Tally<'a>> = Vec::new();

    for &r in restaurants {
        for cuisine in &r.cuisines {
            let slot = *index.entry(cuisine.as_str()).or_insert_with(|| {
                tallies.push(Tally {
                    cuisine,
                    count: 0,
                    rating_sum: 0.0,
                });
                tallies.len() - 1
            });
            tallies[slot].count += 1;
            tallies[slot].rating_sum += r.rating;
        }
    }

    tallies
}

fn cuisine_counts(tallies: &[Tally<'_>]) -> Vec<CuisineCount> {
    let mut counts: Vec<CuisineCount> = tallies
        .iter()
        .map(|t| CuisineCount {
            cuisine: t.cuisine.to_string(),
            count: t.count,
        })
        .collect();
    // Stable, so equal counts stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_CUISINES);
    counts
}

fn top_rated_cuisines(tallies: &[Tally<'_>]) -> Vec<CuisineRating> {
    let mut ratings: Vec<CuisineRating> = tallies
        .iter()
        .map(|t| CuisineRating {
            cuisine: t.cuisine.to_string(),
            average_rating: t.rating_sum / t.count as f64,
            restaurants: t.count,
        })
        .collect();
    ratings.sort_by(|a, b| match (a.average_rating.is_nan(), b.average_rating.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b
            .average_rating
            .partial_cmp(&a.average_rating)
            .unwrap_or(Ordering::Equal),
    });
    ratings.truncate(TOP_RATED_CUISINES);
    ratings
}

fn cost_bands(restaurants: &[&Restaurant]) -> Vec<BandCount<CostBand>> {
    CostBand::ALL
        .iter()
        .map(|&band| BandCount {
            band,
            label: band.label(),
            count: restaurants
                .iter()
                .filter(|r| CostBand::of(r.cost_for_two) == band)
                .count(),
        })
        .collect()
}

fn rating_bands(restaurants: &[&Restaurant]) -> Vec<BandCount<RatingBand>> {
    RatingBand::ALL
        .iter()
        .map(|&band| BandCount {
            band,
            label: band.label(),
            count: restaurants
                .iter()
                .filter(|r| RatingBand::of(r.rating) == band)
                .count(),
        })
        .collect()
}
