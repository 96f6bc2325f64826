//! Infrastructure Risk Radar CLI
//!
//! Scores a city indicator table for one set of weights and writes the
//! dashboard report.
//!
//! Usage:
//!   risk-radar --data data/city_infrastructure_sample.csv \
//!              --infrastructure 0.5 --preparedness 0.2 \
//!              --output data/risk_report.json --geojson

use anyhow::Result;
use clap::Parser;
use risk_radar::{export, loader, CityRecord, Dashboard, RiskWeights, DEFAULT_DATA_PATH};
use risk_scorer::weights::{W_ECONOMIC, W_INFRASTRUCTURE, W_POPULATION, W_PREPAREDNESS};
use risk_scorer::{validate_records, validate_weights};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "risk-radar",
    about = "Score city infrastructure risk and export dashboard data"
)]
struct Args {
    /// Path to the city indicator table (.csv or .json)
    #[arg(short, long, default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Infrastructure condition weight
    #[arg(long, default_value_t = W_INFRASTRUCTURE)]
    infrastructure: f64,

    /// Disaster preparedness weight
    #[arg(long, default_value_t = W_PREPAREDNESS)]
    preparedness: f64,

    /// Economic resilience weight
    #[arg(long, default_value_t = W_ECONOMIC)]
    economic: f64,

    /// Population pressure weight
    #[arg(long, default_value_t = W_POPULATION)]
    population: f64,

    /// Output JSON report
    #[arg(short, long, default_value = "data/risk_report.json")]
    output: PathBuf,

    /// Also output GeoJSON map layer
    #[arg(long)]
    geojson: bool,

    /// Also output the scored table as CSV
    #[arg(long)]
    csv: bool,

    /// Reject missing or out-of-range indicators instead of scoring them
    #[arg(long)]
    strict: bool,

    /// Number of highest-risk cities to list
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Weights from the command line, rejected if any is negative or non-finite
    fn weights(&self) -> Result<RiskWeights> {
        let weights = RiskWeights::new(
            self.infrastructure,
            self.preparedness,
            self.economic,
            self.population,
        );
        validate_weights(&weights)?;
        Ok(weights)
    }

    /// Load the table, validating every row first in strict mode
    fn load_records(&self) -> Result<Vec<CityRecord>> {
        let records = loader::load_records(&self.data)?;
        if self.strict {
            validate_records(&records)?;
            info!("Strict validation passed for {} cities", records.len());
        }
        Ok(records)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{}", "=".repeat(60));
    info!("Infrastructure Risk Radar");
    info!("{}", "=".repeat(60));

    let weights = args.weights()?;
    let records = args.load_records()?;

    let dashboard = Dashboard::build(&records, &weights)?;

    info!("\nTop {} cities by risk score:", args.top);
    for row in dashboard.city_table.iter().take(args.top) {
        info!(
            "  {:6.1} | {:8} | {:24} | {}",
            row.risk_score,
            row.risk_level.map(|l| l.as_str()).unwrap_or("-"),
            row.city,
            row.country
        );
    }

    export::write_json(&args.output, &dashboard)?;

    if args.geojson {
        let geojson_path = args.output.with_extension("geojson");
        export::write_geojson(&geojson_path, &export::to_geojson(&dashboard.scored))?;
    }

    if args.csv {
        let csv_path = args.output.with_extension("csv");
        export::write_scored_csv(&csv_path, &dashboard.scored)?;
    }

    // Summary
    let overview = &dashboard.overview;
    info!("\n{}", "=".repeat(60));
    info!("SUMMARY");
    info!("{}", "=".repeat(60));
    info!("Cities assessed: {}", overview.cities_assessed);
    info!(
        "Highest risk city: {}",
        overview.highest_risk_city.as_deref().unwrap_or("n/a")
    );
    info!(
        "Most resilient city: {}",
        overview.most_resilient_city.as_deref().unwrap_or("n/a")
    );
    info!(
        "Average risk score: {:.1} ±{:.1} (stdev)",
        overview.average_risk_score, overview.risk_score_std
    );
    for (level, count) in &overview.risk_level_distribution {
        info!("  {}: {} cities", level, count);
    }
    if overview.unclassified_cities > 0 {
        info!("  Unclassified: {} cities", overview.unclassified_cities);
    }
    info!(
        "Total population assessed: {:.1} million residents",
        overview.total_population_millions
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_radar::ScoreError;
    use std::io::Write;
    use tempfile::Builder;

    const HEADER: &str = "city,country,region,latitude,longitude,road_quality_index,power_grid_stability,water_security,healthcare_capacity,disaster_preparedness_score,gdp_per_capita_usd,population_millions";

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("risk-radar").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_weights() {
        let weights = parse(&[]).weights().unwrap();
        assert_eq!(weights, RiskWeights::default());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = parse(&["--economic=-0.5"]).weights().unwrap_err();
        match err.downcast_ref::<ScoreError>() {
            Some(ScoreError::InvalidWeight { name, value }) => {
                assert_eq!(*name, "economic");
                assert_eq!(*value, -0.5);
            }
            other => panic!("expected invalid weight, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_rejects_out_of_range_rows() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "Quito,Ecuador,Andes,-0.18,-78.46,120,60,55,50,48,6200,2.8").unwrap();
        let path = file.path().to_str().unwrap();

        let lenient = parse(&["--data", path]).load_records().unwrap();
        assert_eq!(lenient[0].road_quality_index, 120.0);

        let err = parse(&["--data", path, "--strict"]).load_records().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScoreError>(),
            Some(ScoreError::Range { field: "road_quality_index", .. })
        ));
    }
}
