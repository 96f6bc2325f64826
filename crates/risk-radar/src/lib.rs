//! Infrastructure Risk Radar
//!
//! Loads a city indicator table, scores it with [`risk_scorer`] and derives
//! everything a dashboard draws from the scored table:
//!
//! - overview metrics (highest/lowest risk city, mean ± stdev, level counts)
//! - per-country averages
//! - a city table sorted by risk
//! - bar, scatter and map (GeoJSON) projections
//!
//! Every view is rebuilt from scratch for each set of weights.

use thiserror::Error;

pub mod dashboard;
pub mod export;
pub mod loader;

pub use dashboard::Dashboard;
pub use risk_scorer::{CityRecord, RiskLevel, RiskWeights, ScoreError, ScoredCityRecord};

/// Default input table, relative to the workspace root
pub const DEFAULT_DATA_PATH: &str = "data/city_infrastructure_sample.csv";

#[derive(Error, Debug)]
pub enum RadarError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Score(#[from] ScoreError),
}

pub type Result<T> = std::result::Result<T, RadarError>;
