//! Dashboard views derived from a scored city table
//!
//! Descriptive statistics skip NaN the way data-frame reductions do; a view
//! over an all-NaN column reports NaN (serialized as `null`).

use crate::Result;
use risk_scorer::{score, CityRecord, NormalizedWeights, RiskLevel, RiskWeights, ScoredCityRecord};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::info;

/// Headline metrics for the whole table
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub highest_risk_city: Option<String>,
    pub most_resilient_city: Option<String>,
    pub average_risk_score: f64,
    /// Sample standard deviation (n − 1)
    pub risk_score_std: f64,
    pub cities_assessed: usize,
    pub total_population_millions: f64,
    pub risk_level_distribution: BTreeMap<String, usize>,
    /// Cities whose score fell outside every bucket
    pub unclassified_cities: usize,
}

/// Per-country averages
#[derive(Debug, Clone, Serialize)]
pub struct CountrySummary {
    pub country: String,
    pub cities: usize,
    pub risk_score: f64,
    pub avg_infrastructure_quality: f64,
    pub disaster_preparedness_score: f64,
}

/// One row of the city diagnostics table
#[derive(Debug, Clone, Serialize)]
pub struct CityTableRow {
    pub city: String,
    pub country: String,
    pub region: String,
    pub risk_score: f64,
    pub risk_level: Option<RiskLevel>,
    pub avg_infrastructure_quality: f64,
    pub disaster_preparedness_score: f64,
    pub economic_vulnerability: f64,
    pub population_pressure: f64,
}

/// Bar chart datum: city vs risk score
#[derive(Debug, Clone, Serialize)]
pub struct RiskBar {
    pub city: String,
    pub country: String,
    pub risk_score: f64,
    pub risk_level: Option<RiskLevel>,
}

/// Scatter chart datum: infrastructure quality vs risk score
#[derive(Debug, Clone, Serialize)]
pub struct QualityPoint {
    pub city: String,
    pub country: String,
    pub avg_infrastructure_quality: f64,
    pub risk_score: f64,
    pub population_millions: f64,
}

/// Everything one dashboard render needs, computed for a single set of weights
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub weights: NormalizedWeights,
    pub overview: Overview,
    pub countries: Vec<CountrySummary>,
    pub city_table: Vec<CityTableRow>,
    pub risk_bars: Vec<RiskBar>,
    pub quality_scatter: Vec<QualityPoint>,
    pub generated_at: String,
    /// Scored rows in input order, for exports that need the full table
    #[serde(skip)]
    pub scored: Vec<ScoredCityRecord>,
}

impl Dashboard {
    /// Score the records once and assemble every view
    pub fn build(records: &[CityRecord], weights: &RiskWeights) -> Result<Self> {
        let scored = score(records, weights)?;
        let dashboard = Self::from_scored(scored, weights.normalized());

        info!(
            "Dashboard built: {} cities, {} countries, highest risk {}",
            dashboard.overview.cities_assessed,
            dashboard.countries.len(),
            dashboard.overview.highest_risk_city.as_deref().unwrap_or("n/a")
        );

        Ok(dashboard)
    }

    /// Assemble every view from an already scored table
    pub fn from_scored(scored: Vec<ScoredCityRecord>, weights: NormalizedWeights) -> Self {
        Self {
            weights,
            overview: overview(&scored),
            countries: country_summaries(&scored),
            city_table: city_table(&scored),
            risk_bars: risk_bars(&scored),
            quality_scatter: quality_scatter(&scored),
            generated_at: chrono::Utc::now().to_rfc3339(),
            scored,
        }
    }
}

/// Headline metrics
pub fn overview(scored: &[ScoredCityRecord]) -> Overview {
    let risk: Vec<f64> = scored.iter().map(|s| s.risk_score).collect();

    let mut distribution: BTreeMap<String, usize> = RiskLevel::ALL
        .iter()
        .map(|level| (level.to_string(), 0))
        .collect();
    let mut unclassified_cities = 0;
    for s in scored {
        match s.risk_level {
            Some(level) => *distribution.entry(level.to_string()).or_default() += 1,
            None => unclassified_cities += 1,
        }
    }

    Overview {
        highest_risk_city: arg_extreme(&risk, Ordering::Greater).map(|i| scored[i].record.city.clone()),
        most_resilient_city: arg_extreme(&risk, Ordering::Less).map(|i| scored[i].record.city.clone()),
        average_risk_score: nan_mean(risk.iter().copied()),
        risk_score_std: nan_sample_std(risk.iter().copied()),
        cities_assessed: scored.len(),
        total_population_millions: scored
            .iter()
            .map(|s| s.record.population_millions)
            .filter(|p| !p.is_nan())
            .sum(),
        risk_level_distribution: distribution,
        unclassified_cities,
    }
}

/// Per-country averages, sorted by country name
pub fn country_summaries(scored: &[ScoredCityRecord]) -> Vec<CountrySummary> {
    let mut by_country: BTreeMap<&str, Vec<&ScoredCityRecord>> = BTreeMap::new();
    for s in scored {
        by_country.entry(s.record.country.as_str()).or_default().push(s);
    }

    by_country
        .into_iter()
        .map(|(country, rows)| CountrySummary {
            country: country.to_string(),
            cities: rows.len(),
            risk_score: nan_mean(rows.iter().map(|s| s.risk_score)),
            avg_infrastructure_quality: nan_mean(rows.iter().map(|s| s.avg_infrastructure_quality)),
            disaster_preparedness_score: nan_mean(
                rows.iter().map(|s| s.record.disaster_preparedness_score),
            ),
        })
        .collect()
}

/// City diagnostics table, highest risk first
pub fn city_table(scored: &[ScoredCityRecord]) -> Vec<CityTableRow> {
    ranked(scored)
        .into_iter()
        .map(|s| CityTableRow {
            city: s.record.city.clone(),
            country: s.record.country.clone(),
            region: s.record.region.clone(),
            risk_score: s.risk_score,
            risk_level: s.risk_level,
            avg_infrastructure_quality: s.avg_infrastructure_quality,
            disaster_preparedness_score: s.record.disaster_preparedness_score,
            economic_vulnerability: s.economic_vulnerability,
            population_pressure: s.population_pressure,
        })
        .collect()
}

/// Bar chart projection, highest risk first
pub fn risk_bars(scored: &[ScoredCityRecord]) -> Vec<RiskBar> {
    ranked(scored)
        .into_iter()
        .map(|s| RiskBar {
            city: s.record.city.clone(),
            country: s.record.country.clone(),
            risk_score: s.risk_score,
            risk_level: s.risk_level,
        })
        .collect()
}

/// Scatter chart projection, in input order
pub fn quality_scatter(scored: &[ScoredCityRecord]) -> Vec<QualityPoint> {
    scored
        .iter()
        .map(|s| QualityPoint {
            city: s.record.city.clone(),
            country: s.record.country.clone(),
            avg_infrastructure_quality: s.avg_infrastructure_quality,
            risk_score: s.risk_score,
            population_millions: s.record.population_millions,
        })
        .collect()
}

/// Stable sort by risk score descending, NaN last
fn ranked(scored: &[ScoredCityRecord]) -> Vec<&ScoredCityRecord> {
    let mut rows: Vec<&ScoredCityRecord> = scored.iter().collect();
    rows.sort_by(|a, b| risk_descending(a.risk_score, b.risk_score));
    rows
}

fn risk_descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Index of the first maximum (`Greater`) or minimum (`Less`), skipping NaN
fn arg_extreme(values: &[f64], want: Ordering) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if v.partial_cmp(&current) != Some(want) => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Mean skipping NaN; NaN when nothing remains
pub fn nan_mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .filter(|v| !v.is_nan())
        .fold((0.0_f64, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Sample standard deviation skipping NaN; NaN with fewer than two values
pub fn nan_sample_std(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.filter(|v| !v.is_nan()).collect();
    if values.len() < 2 {
        return f64::NAN;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
