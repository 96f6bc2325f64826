//! Report and map-layer exports

use crate::Result;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use risk_scorer::ScoredCityRecord;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, info};

/// Map projection: one point per city carrying its risk score and level
///
/// Cities without finite coordinates cannot be placed and are left out.
pub fn to_geojson(scored: &[ScoredCityRecord]) -> FeatureCollection {
    let features: Vec<Feature> = scored
        .iter()
        .filter(|s| {
            let placeable = s.record.latitude.is_finite() && s.record.longitude.is_finite();
            if !placeable {
                debug!("Skipping {} on map: no coordinates", s.record.city);
            }
            placeable
        })
        .map(|s| {
            let mut properties = JsonObject::new();
            properties.insert("city".to_string(), serde_json::json!(s.record.city));
            properties.insert("country".to_string(), serde_json::json!(s.record.country));
            properties.insert("region".to_string(), serde_json::json!(s.record.region));
            properties.insert("risk_score".to_string(), serde_json::json!(s.risk_score));
            properties.insert(
                "risk_level".to_string(),
                serde_json::json!(s.risk_level.map(|l| l.as_str())),
            );
            properties.insert(
                "avg_infrastructure_quality".to_string(),
                serde_json::json!(s.avg_infrastructure_quality),
            );

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![
                    s.record.longitude,
                    s.record.latitude,
                ]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Write any serializable report as pretty JSON
pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    info!("Writing JSON to {:?}", path);
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// Write the map layer as GeoJSON
pub fn write_geojson(path: impl AsRef<Path>, collection: &FeatureCollection) -> Result<()> {
    let path = path.as_ref();
    info!(
        "Writing GeoJSON ({} features) to {:?}",
        collection.features.len(),
        path
    );
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, collection)?;
    Ok(())
}

/// Flat CSV row of the augmented table; missing numbers are written as empty cells
#[derive(Serialize)]
struct ScoredCsvRow<'a> {
    city: &'a str,
    country: &'a str,
    region: &'a str,
    latitude: Option<f64>,
    longitude: Option<f64>,
    road_quality_index: Option<f64>,
    power_grid_stability: Option<f64>,
    water_security: Option<f64>,
    healthcare_capacity: Option<f64>,
    disaster_preparedness_score: Option<f64>,
    gdp_per_capita_usd: Option<f64>,
    population_millions: Option<f64>,
    avg_infrastructure_quality: Option<f64>,
    infrastructure_gap: Option<f64>,
    preparedness_gap: Option<f64>,
    economic_vulnerability: Option<f64>,
    population_pressure: Option<f64>,
    risk_score: Option<f64>,
    risk_level: Option<&'static str>,
}

fn cell(value: f64) -> Option<f64> {
    (!value.is_nan()).then_some(value)
}

impl<'a> From<&'a ScoredCityRecord> for ScoredCsvRow<'a> {
    fn from(s: &'a ScoredCityRecord) -> Self {
        let r = &s.record;
        Self {
            city: &r.city,
            country: &r.country,
            region: &r.region,
            latitude: cell(r.latitude),
            longitude: cell(r.longitude),
            road_quality_index: cell(r.road_quality_index),
            power_grid_stability: cell(r.power_grid_stability),
            water_security: cell(r.water_security),
            healthcare_capacity: cell(r.healthcare_capacity),
            disaster_preparedness_score: cell(r.disaster_preparedness_score),
            gdp_per_capita_usd: cell(r.gdp_per_capita_usd),
            population_millions: cell(r.population_millions),
            avg_infrastructure_quality: cell(s.avg_infrastructure_quality),
            infrastructure_gap: cell(s.infrastructure_gap),
            preparedness_gap: cell(s.preparedness_gap),
            economic_vulnerability: cell(s.economic_vulnerability),
            population_pressure: cell(s.population_pressure),
            risk_score: cell(s.risk_score),
            risk_level: s.risk_level.map(|l| l.as_str()),
        }
    }
}

/// Write the augmented table (input columns plus derived columns) as CSV
pub fn write_scored_csv(path: impl AsRef<Path>, scored: &[ScoredCityRecord]) -> Result<()> {
    let path = path.as_ref();
    info!("Writing scored table ({} rows) to {:?}", scored.len(), path);

    let mut writer = csv::Writer::from_path(path)?;
    for s in scored {
        writer.serialize(ScoredCsvRow::from(s))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_scorer::{score, CityRecord, RiskWeights};
    use tempfile::tempdir;

    fn sample() -> Vec<CityRecord> {
        let make = |city: &str, lat: f64, lon: f64, infra: f64, pop: f64| CityRecord {
            city: city.to_string(),
            country: "Chile".to_string(),
            region: "Andes".to_string(),
            latitude: lat,
            longitude: lon,
            road_quality_index: infra,
            power_grid_stability: infra,
            water_security: infra,
            healthcare_capacity: infra,
            disaster_preparedness_score: 68.0,
            gdp_per_capita_usd: 15000.0,
            population_millions: pop,
        };
        vec![
            make("Santiago", -33.4489, -70.6693, 72.0, 6.8),
            make("Valparaiso", -33.0472, -71.6127, 64.0, 1.0),
            make("Nowhere", f64::NAN, f64::NAN, 50.0, 0.2),
        ]
    }

    #[test]
    fn test_geojson_points() {
        let scored = score(&sample(), &RiskWeights::default()).unwrap();
        let collection = to_geojson(&scored);

        assert_eq!(collection.features.len(), 2);
        let santiago = &collection.features[0];
        match &santiago.geometry.as_ref().unwrap().value {
            Value::Point(coords) => assert_eq!(coords, &vec![-70.6693, -33.4489]),
            other => panic!("expected point, got {:?}", other),
        }
        let props = santiago.properties.as_ref().unwrap();
        assert_eq!(props["city"], "Santiago");
        // 0.35·28 + 0.25·32 + 0.20·75 + 0.20·100 = 52.8
        assert_eq!(props["risk_level"], "Moderate");
    }

    #[test]
    fn test_write_reports() {
        let dir = tempdir().unwrap();
        let scored = score(&sample(), &RiskWeights::default()).unwrap();

        let geojson_path = dir.path().join("map.geojson");
        write_geojson(&geojson_path, &to_geojson(&scored)).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&geojson_path).unwrap()).unwrap();
        assert_eq!(written["type"], "FeatureCollection");
        assert_eq!(written["features"].as_array().unwrap().len(), 2);

        let json_path = dir.path().join("scores.json");
        write_json(&json_path, &scored).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(written[1]["city"], "Valparaiso");
        assert!(written[2]["latitude"].is_null());
    }

    #[test]
    fn test_write_scored_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        let scored = score(&sample(), &RiskWeights::default()).unwrap();

        write_scored_csv(&path, &scored).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.get(0), Some("city"));
        assert_eq!(headers.iter().last(), Some("risk_level"));

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get(18), Some("Moderate"));
        // Missing latitude is an empty cell
        assert_eq!(rows[2].get(3), Some(""));
    }
}
