//! Command-line driver for the recommendation engine.
//!
//! Usage:
//!     dishrank recommend --cuisines Thai,Italian --max-cost 60 --sort rating
//!     dishrank recommend --nearby --format json
//!     dishrank validate --catalog data/restaurants.json
//!     dishrank cuisines

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dishrank_engine::{Catalog, EngineConfig, RankedResult, Recommendation};
use dishrank_model::{validate_catalog, GeoPoint, Restaurant, SortKey, UserQuery, VegFilter};
use tracing::info;

#[derive(Parser)]
#[command(name = "dishrank")]
#[command(about = "Rank restaurants against your preferences")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Restaurant catalog (JSON array)
    #[arg(long, global = true, env = "DISHRANK_CATALOG", default_value = "data/restaurants.json")]
    catalog: PathBuf,

    /// Your latitude
    #[arg(long, global = true, env = "DISHRANK_LAT", default_value_t = 40.7128, allow_negative_numbers = true)]
    lat: f64,

    /// Your longitude
    #[arg(long, global = true, env = "DISHRANK_LON", default_value_t = -74.0060, allow_negative_numbers = true)]
    lon: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend restaurants
    Recommend {
        /// Preferred cuisines (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        cuisines: Vec<String>,

        /// Area name fragment, case-insensitive
        #[arg(long, default_value = "")]
        location: String,

        /// Minimum rating (0-5)
        #[arg(long, default_value_t = 0.0)]
        min_rating: f64,

        /// Maximum cost for two
        #[arg(long, default_value_t = 200)]
        max_cost: u32,

        /// any, veg or nonveg
        #[arg(long, default_value = "any")]
        veg: VegFilter,

        /// Only restaurants that deliver
        #[arg(long)]
        delivery: bool,

        /// Only restaurants that take table bookings
        #[arg(long)]
        booking: bool,

        /// Only restaurants within the nearby radius
        #[arg(long)]
        nearby: bool,

        /// Nearby radius in km
        #[arg(long, default_value_t = 5.0)]
        radius: f64,

        /// similarity, rating, cost or distance
        #[arg(short, long, default_value = "similarity")]
        sort: SortKey,

        /// Maximum results
        #[arg(short, long, default_value_t = 12)]
        limit: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Check a catalog file for invalid records
    Validate,

    /// List the cuisines present in the catalog
    Cuisines,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dishrank=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let origin = GeoPoint::new(cli.lat, cli.lon);
    anyhow::ensure!(origin.is_valid(), "invalid user location ({}, {})", cli.lat, cli.lon);

    let restaurants = load_validated(&cli.catalog)?;

    match cli.command {
        Commands::Recommend {
            cuisines,
            location,
            min_rating,
            max_cost,
            veg,
            delivery,
            booking,
            nearby,
            radius,
            sort,
            limit,
            format,
        } => {
            let query = UserQuery::new()
                .with_cuisines(cuisines)
                .with_location(location)
                .with_min_rating(min_rating)
                .with_max_cost(max_cost)
                .with_veg_filter(veg)
                .with_delivery(delivery)
                .with_booking(booking)
                .with_nearby_only(nearby)
                .with_sort_key(sort);
            let config = EngineConfig {
                top_n: limit,
                nearby_radius_km: radius,
                ..Default::default()
            };
            run_recommend(Catalog::new(restaurants, origin), &query, &config, format)?;
        }
        Commands::Validate => {
            println!("{}", validation_report(&cli.catalog, &restaurants));
        }
        Commands::Cuisines => {
            for cuisine in list_cuisines(restaurants, origin) {
                println!("{}", cuisine);
            }
        }
    }

    Ok(())
}

fn read_catalog(path: &Path) -> Result<Vec<Restaurant>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    let restaurants: Vec<Restaurant> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse catalog {}", path.display()))?;
    info!(path = %path.display(), restaurants = restaurants.len(), "catalog loaded");
    Ok(restaurants)
}

/// Read the catalog and reject it if any record breaks an invariant.
fn load_validated(path: &Path) -> Result<Vec<Restaurant>> {
    let restaurants = read_catalog(path)?;
    validate_catalog(&restaurants).with_context(|| format!("invalid catalog {}", path.display()))?;
    Ok(restaurants)
}

fn validation_report(path: &Path, restaurants: &[Restaurant]) -> String {
    format!("{}: {} restaurants OK", path.display(), restaurants.len())
}

fn list_cuisines(restaurants: Vec<Restaurant>, origin: GeoPoint) -> Vec<String> {
    Catalog::new(restaurants, origin)
        .cuisines()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn run_recommend(
    catalog: Catalog,
    query: &UserQuery,
    config: &EngineConfig,
    format: OutputFormat,
) -> Result<()> {
    let recommendation = catalog.recommend(query, config);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&recommendation)?);
        return Ok(());
    }

    match &recommendation {
        Recommendation::Empty => {
            println!("No restaurants match your criteria. Try relaxing a filter.");
        }
        Recommendation::Ranked(ranked) => print_ranked(ranked),
    }

    Ok(())
}

fn print_ranked(ranked: &RankedResult<'_>) {
    println!(
        "Found {} restaurants matching your preferences (sorted by {})",
        ranked.total_matches, ranked.sort_key
    );
    println!("---");

    for (i, entry) in ranked.results.iter().enumerate() {
        let r = entry.scored.restaurant;
        println!("\n{}. {} ({})", i + 1, r.name, r.location);
        println!(
            "   Rating: {:.1} | Cost for two: ${} | Distance: {}",
            r.rating,
            r.cost_for_two,
            r.distance_km
                .map(|d| format!("{:.1} km", d))
                .unwrap_or_else(|| "unknown".to_string())
        );
        println!(
            "   {} | {}{}",
            r.cuisines.join(", "),
            if r.veg { "Vegetarian" } else { "Non-Vegetarian" },
            match (r.delivery, r.table_booking) {
                (true, true) => " | Delivery, Booking",
                (true, false) => " | Delivery",
                (false, true) => " | Booking",
                (false, false) => "",
            }
        );
        println!("   Match Score: {}%", entry.scored.similarity);
        println!("   {}", entry.reason);
    }

    let analytics = &ranked.analytics;
    println!("\n--- Analytics");

    println!("Cuisines:");
    for c in &analytics.cuisine_counts {
        println!("   {:<16} {}", c.cuisine, c.count);
    }

    println!("Cost for two:");
    for band in &analytics.cost_band_counts {
        println!("   {:<16} {}", band.label, band.count);
    }

    println!("Ratings:");
    for band in &analytics.rating_band_counts {
        println!("   {:<16} {}", band.label, band.count);
    }

    println!("Top rated cuisines:");
    for c in &analytics.top_cuisine_avg_ratings {
        println!("   {:<16} {:.1} ({} restaurants)", c.cuisine, c.average_rating, c.restaurants);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_recommend_args() {
        let cli = Cli::try_parse_from([
            "dishrank",
            "--lon",
            "-73.99",
            "recommend",
            "--cuisines",
            "Thai,Italian",
            "--veg",
            "nonveg",
            "--sort",
            "distance",
            "--nearby",
        ])
        .unwrap();

        assert_eq!(cli.lon, -73.99);
        match cli.command {
            Commands::Recommend {
                cuisines,
                veg,
                sort,
                nearby,
                limit,
                ..
            } => {
                assert_eq!(cuisines, vec!["Thai", "Italian"]);
                assert_eq!(veg, VegFilter::NonVegOnly);
                assert_eq!(sort, SortKey::Distance);
                assert!(nearby);
                assert_eq!(limit, 12);
            }
            _ => panic!("expected recommend"),
        }
    }

    #[test]
    fn test_rejects_unknown_sort() {
        assert!(Cli::try_parse_from(["dishrank", "recommend", "--sort", "vibes"]).is_err());
    }

    fn sample_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/restaurants.json")
    }

    #[test]
    fn test_read_sample_catalog() {
        let restaurants = read_catalog(&sample_path()).unwrap();
        assert_eq!(restaurants.len(), 15);
        assert!(validate_catalog(&restaurants).is_ok());
    }

    #[test]
    fn test_validate_command_reports_sample() {
        let cli = Cli::try_parse_from(["dishrank", "validate"]).unwrap();
        assert!(matches!(cli.command, Commands::Validate));

        let path = sample_path();
        let restaurants = load_validated(&path).unwrap();
        assert_eq!(
            validation_report(&path, &restaurants),
            format!("{}: 15 restaurants OK", path.display())
        );
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let raw = fs::read_to_string(sample_path()).unwrap();
        let mut records: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
        records.push(records[0].clone());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        serde_json::to_writer(&mut file, &records).unwrap();
        file.flush().unwrap();

        let err = load_validated(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("invalid catalog"));
        assert_eq!(err.root_cause().to_string(), "duplicate restaurant id 1");
    }

    #[test]
    fn test_cuisines_command_lists_sample_in_first_seen_order() {
        let cli = Cli::try_parse_from(["dishrank", "cuisines"]).unwrap();
        assert!(matches!(cli.command, Commands::Cuisines));

        let restaurants = load_validated(&sample_path()).unwrap();
        let cuisines = list_cuisines(restaurants, GeoPoint::new(cli.lat, cli.lon));
        assert_eq!(cuisines.len(), 21);
        assert_eq!(
            &cuisines[..5],
            &["Italian", "Mediterranean", "Vegetarian", "Indian", "Thai"]
        );
        assert_eq!(cuisines.last().map(String::as_str), Some("Cantonese"));
    }
}
