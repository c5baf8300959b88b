//! End-to-end recommendation scenarios.

use dishrank_engine::{explain, recommend, Catalog, EngineConfig, Recommendation};
use dishrank_model::{validate_catalog, GeoPoint, Restaurant, SortKey, UserQuery};
use pretty_assertions::assert_eq;

const SAMPLE_CATALOG: &str = include_str!("../../../data/restaurants.json");

fn lower_manhattan() -> GeoPoint {
    GeoPoint::new(40.7128, -74.0060)
}

fn sample_catalog() -> Catalog {
    let restaurants: Vec<Restaurant> = serde_json::from_str(SAMPLE_CATALOG).unwrap();
    validate_catalog(&restaurants).unwrap();
    Catalog::new(restaurants, lower_manhattan())
}

fn three_restaurants() -> Vec<Restaurant> {
    let make = |id: u32, rating: f64, cuisines: &[&str], cost: u32| Restaurant {
        rating,
        cost_for_two: cost,
        cuisines: cuisines.iter().map(|c| c.to_string()).collect(),
        ..Restaurant::new(id, format!("R{id}"))
    };
    vec![
        make(1, 3.0, &["Italian"], 20),
        make(2, 4.8, &["Italian", "Thai"], 50),
        make(3, 4.0, &["Mexican"], 30),
    ]
}

fn result_ids(recommendation: &Recommendation<'_>) -> Vec<u32> {
    recommendation
        .ranked()
        .map(|r| r.results.iter().map(|e| e.scored.restaurant.id).collect())
        .unwrap_or_default()
}

#[test]
fn rating_sort_orders_by_rating_descending() {
    let catalog = Catalog::new(three_restaurants(), GeoPoint::new(0.0, 0.0));
    let query = UserQuery::new()
        .with_cuisines(["Italian"])
        .with_max_cost(100)
        .with_sort_key(SortKey::Rating);

    let recommendation = catalog.recommend(&query, &EngineConfig::default());
    let ranked = recommendation.ranked().unwrap();

    assert_eq!(ranked.total_matches, 3);
    let ratings: Vec<f64> = ranked.results.iter().map(|e| e.scored.restaurant.rating).collect();
    assert_eq!(ratings, vec![4.8, 4.0, 3.0]);
}

#[test]
fn unreachable_min_rating_yields_empty() {
    let restaurants = three_restaurants();
    let query = UserQuery::new().with_min_rating(5.0);
    let recommendation = recommend(&restaurants, &query, &EngineConfig::default());
    assert!(recommendation.is_empty());
    assert!(recommendation.ranked().is_none());
}

#[test]
fn expensive_restaurant_scores_reproducibly() {
    let restaurants = vec![Restaurant {
        rating: 4.0,
        cost_for_two: 200,
        cuisines: vec!["Steakhouse".to_string()],
        ..Restaurant::new(1, "Prime Cut")
    }];
    let query = UserQuery::new().with_max_cost(250);
    let config = EngineConfig::default();

    let first = recommend(&restaurants, &query, &config);
    let second = recommend(&restaurants, &query, &config);

    let score = |r: &Recommendation<'_>| r.ranked().unwrap().results[0].scored.similarity;
    assert_eq!(score(&first), 48);
    assert_eq!(score(&first), score(&second));
}

#[test]
fn catalog_is_not_mutated_by_requests() {
    let catalog = sample_catalog();
    let before = catalog.restaurants().to_vec();

    let query = UserQuery::new().with_cuisines(["Thai"]).with_sort_key(SortKey::Cost);
    let _ = catalog.recommend(&query, &EngineConfig::default());

    assert_eq!(catalog.restaurants(), before.as_slice());
}

#[test]
fn thai_preference_on_sample_catalog() {
    let catalog = sample_catalog();
    let query = UserQuery::new().with_cuisines(["Thai"]);
    let recommendation = catalog.recommend(&query, &EngineConfig::default());

    let ranked = recommendation.ranked().unwrap();
    assert_eq!(ranked.total_matches, 15);
    assert_eq!(ranked.results.len(), 12);
    assert_eq!(&result_ids(&recommendation)[..2], &[8, 3]);

    let top = &ranked.results[0];
    assert_eq!(top.scored.similarity, 94);
    assert_eq!(
        top.reason,
        "This restaurant is matches your preference for Thai cuisine, budget-friendly, \
         nearby location."
    );
    assert_eq!(explain(&top.scored, &query), top.reason);
}

#[test]
fn nearby_distance_sort_on_sample_catalog() {
    let catalog = sample_catalog();
    let query = UserQuery::new()
        .with_nearby_only(true)
        .with_sort_key(SortKey::Distance);
    let recommendation = catalog.recommend(&query, &EngineConfig::default());

    assert_eq!(
        result_ids(&recommendation),
        vec![1, 15, 8, 2, 3, 11, 9, 4, 6, 10, 14, 7]
    );
}

#[test]
fn combined_constraints_on_sample_catalog() {
    let catalog = sample_catalog();
    let query = UserQuery::new()
        .with_location("village")
        .with_booking(true)
        .with_sort_key(SortKey::Rating);
    let recommendation = catalog.recommend(&query, &EngineConfig::default());

    // West Village bistro and East Village taqueria take bookings
    assert_eq!(result_ids(&recommendation), vec![9, 4]);

    let ranked = recommendation.ranked().unwrap();
    let rating_bands: Vec<usize> = ranked.analytics.rating_band_counts.iter().map(|b| b.count).collect();
    assert_eq!(rating_bands, vec![0, 0, 1, 0, 1]);
}

#[test]
fn relocating_changes_nearby_candidates() {
    let mut catalog = sample_catalog();
    let query = UserQuery::new().with_nearby_only(true);
    let downtown = catalog.recommend(&query, &EngineConfig::default()).ranked().unwrap().total_matches;

    catalog.relocate(GeoPoint::new(40.8116, -73.9465));
    let uptown = result_ids(&catalog.recommend(&query, &EngineConfig::default()));

    assert_eq!(downtown, 12);
    assert!(uptown.contains(&12));
    assert!(!uptown.contains(&1));
}

#[test]
fn recommendation_serializes_with_status_tag() {
    let restaurants = three_restaurants();
    let empty = recommend(&restaurants, &UserQuery::new().with_min_rating(5.0), &EngineConfig::default());
    assert_eq!(serde_json::to_value(&empty).unwrap()["status"], "empty");

    let ranked = recommend(&restaurants, &UserQuery::new(), &EngineConfig::default());
    let json = serde_json::to_value(&ranked).unwrap();
    assert_eq!(json["status"], "ranked");
    assert_eq!(json["total_matches"], 3);
    assert!(json["results"][0]["similarity"].is_u64());
    assert!(json["results"][0]["restaurant"]["name"].is_string());
}

#[test]
fn repeated_cuisine_selection_does_not_dilute_score() {
    let catalog = sample_catalog();
    let config = EngineConfig::default();

    let once = UserQuery::new().with_cuisines(["Thai"]);
    // Bypass the builder, as a deserialised query would
    let mut twice = once.clone();
    twice.selected_cuisines = vec!["Thai".to_string(), "Thai".to_string()];

    let top = |r: &Recommendation<'_>| {
        let entry = &r.ranked().unwrap().results[0];
        (entry.scored.restaurant.id, entry.scored.similarity, entry.reason.clone())
    };
    assert_eq!(top(&catalog.recommend(&twice, &config)), top(&catalog.recommend(&once, &config)));
}
