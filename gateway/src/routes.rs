//! Scoring routes
//!
//! Every route that takes weights rescores the whole table for that request.
//! Weights arrive as optional query parameters; absent ones take defaults.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use geojson::FeatureCollection;
use risk_radar::{export, CityRecord, Dashboard, RiskWeights, ScoredCityRecord};
use risk_scorer::{score, validate_weights, NormalizedWeights};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct WeightsQuery {
    pub infrastructure: Option<f64>,
    pub preparedness: Option<f64>,
    pub economic: Option<f64>,
    pub population: Option<f64>,
}

impl WeightsQuery {
    /// Merge with defaults and reject negative or non-finite weights
    fn weights(&self) -> Result<RiskWeights, (StatusCode, String)> {
        let defaults = RiskWeights::default();
        let weights = RiskWeights::new(
            self.infrastructure.unwrap_or(defaults.infrastructure),
            self.preparedness.unwrap_or(defaults.preparedness),
            self.economic.unwrap_or(defaults.economic),
            self.population.unwrap_or(defaults.population),
        );
        validate_weights(&weights).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
        Ok(weights)
    }
}

#[derive(Serialize)]
pub struct WeightsResponse {
    pub raw: RiskWeights,
    pub normalized: NormalizedWeights,
}

/// List the raw city table
pub async fn list_cities(State(state): State<AppState>) -> Json<Vec<CityRecord>> {
    Json(state.records.as_ref().clone())
}

/// Show how the requested weights normalize
pub async fn get_weights(
    Query(query): Query<WeightsQuery>,
) -> Result<Json<WeightsResponse>, (StatusCode, String)> {
    let raw = query.weights()?;
    Ok(Json(WeightsResponse {
        raw,
        normalized: raw.normalized(),
    }))
}

/// Scored table in input order
pub async fn get_scores(
    State(state): State<AppState>,
    Query(query): Query<WeightsQuery>,
) -> Result<Json<Vec<ScoredCityRecord>>, (StatusCode, String)> {
    let weights = query.weights()?;
    let scored = score(&state.records, &weights)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    Ok(Json(scored))
}

/// Full dashboard payload
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<WeightsQuery>,
) -> Result<Json<Dashboard>, (StatusCode, String)> {
    let weights = query.weights()?;
    let dashboard = Dashboard::build(&state.records, &weights)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    Ok(Json(dashboard))
}

/// Map layer as GeoJSON
pub async fn get_map(
    State(state): State<AppState>,
    Query(query): Query<WeightsQuery>,
) -> Result<Json<FeatureCollection>, (StatusCode, String)> {
    let weights = query.weights()?;
    let scored = score(&state.records, &weights)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    Ok(Json(export::to_geojson(&scored)))
}
