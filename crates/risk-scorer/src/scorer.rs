//! Risk scoring implementation
//!
//! Implements the 4-factor model:
//! Risk(city) = w₁·G_I + w₂·G_P + w₃·V_E + w₄·P_P
//!
//! Weights are normalized once per call and the population maximum is taken
//! over the whole table before any row is scored. Missing values (NaN) flow
//! through the arithmetic; nothing is clamped except GDP and the economic
//! shortfall.

use crate::weights::{NormalizedWeights, RiskWeights};
use crate::{
    CityRecord, Result, RiskLevel, ScoreError, ScoredCityRecord, ECONOMIC_BASELINE_USD, SCALE_MAX,
};
use tracing::{debug, info};

/// Score every city against the given weights
///
/// Output has one row per input row, in input order. The input slice and the
/// weights are only read; each output row owns a copy of its source record.
pub fn score(records: &[CityRecord], weights: &RiskWeights) -> Result<Vec<ScoredCityRecord>> {
    if records.is_empty() {
        return Err(ScoreError::EmptyInput);
    }

    let normalized = weights.normalized();
    let max_population = max_population(records);

    let scored: Vec<ScoredCityRecord> = records
        .iter()
        .map(|record| score_record(record, &normalized, max_population))
        .collect();

    info!(
        "Scored {} cities (w_infra={:.3}, w_prep={:.3}, w_econ={:.3}, w_pop={:.3})",
        scored.len(),
        normalized.infrastructure(),
        normalized.preparedness(),
        normalized.economic(),
        normalized.population()
    );

    Ok(scored)
}

/// Score a single city
fn score_record(
    record: &CityRecord,
    weights: &NormalizedWeights,
    max_population: f64,
) -> ScoredCityRecord {
    // G_I: infrastructure gap
    let avg_infrastructure_quality = average_infrastructure_quality(record);
    let infrastructure_gap = SCALE_MAX - avg_infrastructure_quality;

    // G_P: preparedness gap
    let preparedness_gap = SCALE_MAX - record.disaster_preparedness_score;

    // V_E: economic vulnerability
    let economic_vulnerability = economic_vulnerability(record.gdp_per_capita_usd);

    // P_P: population pressure
    let population_pressure = population_pressure(record.population_millions, max_population);

    let risk_score = weights.infrastructure() * infrastructure_gap
        + weights.preparedness() * preparedness_gap
        + weights.economic() * economic_vulnerability
        + weights.population() * population_pressure;

    let risk_level = RiskLevel::classify(risk_score);

    debug!(
        "Scored {}: {:.2} (infra_gap={:.2}, prep_gap={:.2}, econ={:.2}, pop={:.2}) -> {:?}",
        record.city,
        risk_score,
        infrastructure_gap,
        preparedness_gap,
        economic_vulnerability,
        population_pressure,
        risk_level
    );

    ScoredCityRecord {
        record: record.clone(),
        avg_infrastructure_quality,
        infrastructure_gap,
        preparedness_gap,
        economic_vulnerability,
        population_pressure,
        risk_score,
        risk_level,
    }
}

/// Mean of the four infrastructure sub-indicators, skipping NaN
///
/// NaN only if all four are missing.
pub fn average_infrastructure_quality(record: &CityRecord) -> f64 {
    let (sum, count) = record
        .infrastructure_indicators()
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0_f64, 0usize), |(sum, count), v| (sum + *v, count + 1));

    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// GDP per capita shortfall against the baseline, scaled to 0-100
///
/// Both GDP and the shortfall are floored at zero. NaN stays NaN.
pub fn economic_vulnerability(gdp_per_capita_usd: f64) -> f64 {
    if gdp_per_capita_usd.is_nan() {
        return f64::NAN;
    }
    let gdp = gdp_per_capita_usd.max(0.0);
    ((ECONOMIC_BASELINE_USD - gdp).max(0.0) / ECONOMIC_BASELINE_USD) * SCALE_MAX
}

/// Population relative to the largest population in the set, scaled to 0-100
pub fn population_pressure(population_millions: f64, max_population: f64) -> f64 {
    (population_millions / max_population) * SCALE_MAX
}

/// Largest population in the table, skipping NaN
///
/// NaN if every population is missing.
pub fn max_population(records: &[CityRecord]) -> f64 {
    // f64::max ignores a NaN operand, so the NaN seed only survives an all-NaN column
    records
        .iter()
        .map(|r| r.population_millions)
        .fold(f64::NAN, f64::max)
}
