//! Infrastructure Risk Scorer
//!
//! Turns a table of per-city infrastructure indicators into a weighted
//! composite risk score and a three-bucket risk level.
//!
//! # Scoring Model (4-Factor)
//!
//! ```text
//! Risk(city) = w₁·G_I + w₂·G_P + w₃·V_E + w₄·P_P
//! ```
//!
//! | Factor | Default weight | Description |
//! |--------|----------------|-------------|
//! | G_I    | 0.35 | Infrastructure gap (100 − mean of road, power, water, healthcare) |
//! | G_P    | 0.25 | Preparedness gap (100 − disaster preparedness) |
//! | V_E    | 0.20 | Economic vulnerability (GDP per capita shortfall vs 60k USD) |
//! | P_P    | 0.20 | Population pressure (population / largest population in set) |
//!
//! Weights are normalized to sum to 1 before use, so every term on a 0-100
//! scale yields a score on a 0-100 scale.
//!
//! # Risk Levels
//!
//! | Level    | Score range |
//! |----------|-------------|
//! | Low      | (-1, 40]    |
//! | Moderate | (40, 60]    |
//! | High     | (60, 100]   |
//!
//! Scores outside (-1, 100] (or NaN) are left unclassified.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod scorer;
pub mod validate;
pub mod weights;

pub use scorer::score;
pub use validate::{validate_records, validate_weights};
pub use weights::{NormalizedWeights, RiskWeights};

/// GDP per capita (USD) at or above which a city has no economic vulnerability
pub const ECONOMIC_BASELINE_USD: f64 = 60000.0;

/// Upper bound of every indicator and derived term
pub const SCALE_MAX: f64 = 100.0;

/// Risk level bin edges (left-exclusive, right-inclusive)
pub const RISK_LEVEL_EDGES: [f64; 4] = [-1.0, 40.0, 60.0, 100.0];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("No city records to score")]
    EmptyInput,
    #[error("Schema error for {city:?}, field {field}: {reason}")]
    Schema {
        city: String,
        field: &'static str,
        reason: String,
    },
    #[error("Range error for {city:?}, field {field}: {value} not in [{min}, {max}]")]
    Range {
        city: String,
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("Invalid {name} weight: {value} (must be finite and non-negative)")]
    InvalidWeight { name: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, ScoreError>;

/// Categorical risk bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Moderate, RiskLevel::High];

    /// Bucket a risk score using [`RISK_LEVEL_EDGES`]
    pub fn classify(score: f64) -> Option<Self> {
        let [floor, low, moderate, high] = RISK_LEVEL_EDGES;
        if score > floor && score <= low {
            Some(RiskLevel::Low)
        } else if score > low && score <= moderate {
            Some(RiskLevel::Moderate)
        } else if score > moderate && score <= high {
            Some(RiskLevel::High)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the city indicator table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub city: String,
    pub country: String,
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,

    // Infrastructure sub-indicators (0-100)
    pub road_quality_index: f64,
    pub power_grid_stability: f64,
    pub water_security: f64,
    pub healthcare_capacity: f64,

    /// Disaster preparedness (0-100)
    pub disaster_preparedness_score: f64,
    /// GDP per capita in USD
    pub gdp_per_capita_usd: f64,
    /// Population in millions
    pub population_millions: f64,
}

impl CityRecord {
    /// The four sub-indicators averaged into infrastructure quality
    pub fn infrastructure_indicators(&self) -> [f64; 4] {
        [
            self.road_quality_index,
            self.power_grid_stability,
            self.water_security,
            self.healthcare_capacity,
        ]
    }

    /// True if any numeric field is NaN
    pub fn has_missing_values(&self) -> bool {
        [
            self.latitude,
            self.longitude,
            self.road_quality_index,
            self.power_grid_stability,
            self.water_security,
            self.healthcare_capacity,
            self.disaster_preparedness_score,
            self.gdp_per_capita_usd,
            self.population_millions,
        ]
        .iter()
        .any(|v| v.is_nan())
    }
}

/// City record augmented with derived risk columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCityRecord {
    #[serde(flatten)]
    pub record: CityRecord,
    /// Mean of the four infrastructure sub-indicators
    pub avg_infrastructure_quality: f64,
    /// 100 − avg_infrastructure_quality
    pub infrastructure_gap: f64,
    /// 100 − disaster_preparedness_score
    pub preparedness_gap: f64,
    /// GDP shortfall against the 60k USD baseline (0-100)
    pub economic_vulnerability: f64,
    /// Population relative to the largest city in the set (0-100)
    pub population_pressure: f64,
    /// Weighted composite score
    pub risk_score: f64,
    /// Bucketed score, `None` when the score falls outside (-1, 100]
    pub risk_level: Option<RiskLevel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bucket_edges() {
        assert_eq!(RiskLevel::classify(0.0), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::classify(40.0), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::classify(40.000001), Some(RiskLevel::Moderate));
        assert_eq!(RiskLevel::classify(60.0), Some(RiskLevel::Moderate));
        assert_eq!(RiskLevel::classify(60.000001), Some(RiskLevel::High));
        assert_eq!(RiskLevel::classify(100.0), Some(RiskLevel::High));
    }

    #[test]
    fn test_classify_out_of_range() {
        assert_eq!(RiskLevel::classify(-1.0), None);
        assert_eq!(RiskLevel::classify(100.5), None);
        assert_eq!(RiskLevel::classify(f64::NAN), None);
        // Between -1 and 0 is still inside the lowest bin
        assert_eq!(RiskLevel::classify(-0.5), Some(RiskLevel::Low));
    }

    #[test]
    fn test_risk_level_display() {
        let labels: Vec<String> = RiskLevel::ALL.iter().map(|l| l.to_string()).collect();
        assert_eq!(labels, vec!["Low", "Moderate", "High"]);
    }

    #[test]
    fn test_scored_record_serializes_flat() {
        let scored = ScoredCityRecord {
            record: CityRecord {
                city: "Lagos".to_string(),
                country: "Nigeria".to_string(),
                region: "West Africa".to_string(),
                latitude: 6.5244,
                longitude: 3.3792,
                road_quality_index: 45.0,
                power_grid_stability: 38.0,
                water_security: 42.0,
                healthcare_capacity: 40.0,
                disaster_preparedness_score: 35.0,
                gdp_per_capita_usd: 2100.0,
                population_millions: 15.4,
            },
            avg_infrastructure_quality: 41.25,
            infrastructure_gap: 58.75,
            preparedness_gap: 65.0,
            economic_vulnerability: 96.5,
            population_pressure: 100.0,
            risk_score: 75.0,
            risk_level: Some(RiskLevel::High),
        };

        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["city"], "Lagos");
        assert_eq!(json["risk_level"], "High");
        assert_eq!(json["population_pressure"], 100.0);
        assert!(json.get("record").is_none());
    }
}
