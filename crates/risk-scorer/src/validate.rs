//! Strict input validation
//!
//! The scorer itself accepts any numbers. These checks are opt-in for callers
//! that want garbage rejected before it reaches the arithmetic. Both functions
//! stop at the first violation (rows in input order, fields in column order).

use crate::weights::RiskWeights;
use crate::{CityRecord, Result, ScoreError, SCALE_MAX};

/// Reject empty tables, blank identifiers, missing numbers and out-of-range indicators
pub fn validate_records(records: &[CityRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(ScoreError::EmptyInput);
    }
    records.iter().try_for_each(validate_record)
}

fn validate_record(record: &CityRecord) -> Result<()> {
    for (field, value) in [("city", &record.city), ("country", &record.country)] {
        if value.trim().is_empty() {
            return Err(ScoreError::Schema {
                city: record.city.clone(),
                field,
                reason: "blank value".to_string(),
            });
        }
    }

    let numeric = [
        ("latitude", record.latitude, -90.0, 90.0),
        ("longitude", record.longitude, -180.0, 180.0),
        ("road_quality_index", record.road_quality_index, 0.0, SCALE_MAX),
        ("power_grid_stability", record.power_grid_stability, 0.0, SCALE_MAX),
        ("water_security", record.water_security, 0.0, SCALE_MAX),
        ("healthcare_capacity", record.healthcare_capacity, 0.0, SCALE_MAX),
        ("disaster_preparedness_score", record.disaster_preparedness_score, 0.0, SCALE_MAX),
        ("gdp_per_capita_usd", record.gdp_per_capita_usd, 0.0, f64::INFINITY),
        ("population_millions", record.population_millions, 0.0, f64::INFINITY),
    ];

    for (field, value, min, max) in numeric {
        if !value.is_finite() {
            return Err(ScoreError::Schema {
                city: record.city.clone(),
                field,
                reason: "missing or non-finite value".to_string(),
            });
        }
        if !(min..=max).contains(&value) {
            return Err(ScoreError::Range {
                city: record.city.clone(),
                field,
                value,
                min,
                max,
            });
        }
    }

    Ok(())
}

/// Reject negative or non-finite weights
pub fn validate_weights(weights: &RiskWeights) -> Result<()> {
    for (name, value) in weights.components() {
        if !value.is_finite() || value < 0.0 {
            return Err(ScoreError::InvalidWeight { name, value });
        }
    }
    Ok(())
}
