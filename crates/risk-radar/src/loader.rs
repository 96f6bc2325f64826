//! Data loading from CSV and JSON files
//!
//! Empty CSV cells and null/missing JSON numbers load as NaN so they flow
//! through scoring the way missing values do in a data frame.

use crate::{CityRecord, RadarError, Result};
use csv::Reader;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

/// Columns every input table must carry
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "city",
    "country",
    "region",
    "latitude",
    "longitude",
    "road_quality_index",
    "power_grid_stability",
    "water_security",
    "healthcare_capacity",
    "disaster_preparedness_score",
    "gdp_per_capita_usd",
    "population_millions",
];

/// Raw row as it appears in the source file
#[derive(Debug, Deserialize)]
struct RawCityRow {
    city: String,
    country: String,
    #[serde(default)]
    region: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    road_quality_index: Option<f64>,
    power_grid_stability: Option<f64>,
    water_security: Option<f64>,
    healthcare_capacity: Option<f64>,
    disaster_preparedness_score: Option<f64>,
    gdp_per_capita_usd: Option<f64>,
    population_millions: Option<f64>,
}

impl From<RawCityRow> for CityRecord {
    fn from(row: RawCityRow) -> Self {
        let value = |v: Option<f64>| v.unwrap_or(f64::NAN);
        Self {
            city: row.city,
            country: row.country,
            region: row.region,
            latitude: value(row.latitude),
            longitude: value(row.longitude),
            road_quality_index: value(row.road_quality_index),
            power_grid_stability: value(row.power_grid_stability),
            water_security: value(row.water_security),
            healthcare_capacity: value(row.healthcare_capacity),
            disaster_preparedness_score: value(row.disaster_preparedness_score),
            gdp_per_capita_usd: value(row.gdp_per_capita_usd),
            population_millions: value(row.population_millions),
        }
    }
}

/// Load city records, picking the format from the file extension
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<CityRecord>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        _ => Err(RadarError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Load city records from a CSV file with a header row
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<CityRecord>> {
    let path = path.as_ref();
    info!("Loading city indicators from {:?}", path);

    let file = File::open(path)?;
    read_csv(BufReader::new(file))
}

/// Parse city records from any CSV source
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<CityRecord>> {
    let mut reader = Reader::from_reader(reader);

    let headers = reader.headers()?.clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(RadarError::MissingColumn((*missing).to_string()));
    }

    let mut records = Vec::new();
    for row in reader.deserialize::<RawCityRow>() {
        records.push(CityRecord::from(row?));
    }

    log_loaded(&records);
    Ok(records)
}

/// Load city records from a JSON array
pub fn load_json(path: impl AsRef<Path>) -> Result<Vec<CityRecord>> {
    let path = path.as_ref();
    info!("Loading city indicators from {:?}", path);

    let file = File::open(path)?;
    let rows: Vec<RawCityRow> = serde_json::from_reader(BufReader::new(file))?;
    let records: Vec<CityRecord> = rows.into_iter().map(CityRecord::from).collect();

    log_loaded(&records);
    Ok(records)
}

fn log_loaded(records: &[CityRecord]) {
    let incomplete = records.iter().filter(|r| r.has_missing_values()).count();
    if incomplete > 0 {
        warn!(
            "{} of {} cities have missing values; affected scores will be NaN",
            incomplete,
            records.len()
        );
    }
    info!("Loaded {} cities", records.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    const HEADER: &str = "city,country,region,latitude,longitude,road_quality_index,power_grid_stability,water_security,healthcare_capacity,disaster_preparedness_score,gdp_per_capita_usd,population_millions";

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let csv = format!(
            "{}\nJakarta,Indonesia,Southeast Asia,-6.2088,106.8456,58,62,48,55,52,4300,10.6\nSurabaya,Indonesia,Southeast Asia,-7.2575,112.7521,61,65,52,57,55,4300,2.9\n",
            HEADER
        );
        let file = write_temp(".csv", &csv);

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].city, "Jakarta");
        assert_eq!(records[0].population_millions, 10.6);
        assert_eq!(records[1].road_quality_index, 61.0);
    }

    #[test]
    fn test_empty_cell_loads_as_nan() {
        let csv = format!(
            "{}\nDhaka,Bangladesh,South Asia,23.8103,90.4125,42,,40,45,38,2500,22.5\n",
            HEADER
        );
        let records = read_csv(csv.as_bytes()).unwrap();
        assert!(records[0].power_grid_stability.is_nan());
        assert!(records[0].has_missing_values());
        assert_eq!(records[0].water_security, 40.0);
    }

    #[test]
    fn test_missing_column_rejected() {
        let csv = "city,country,region,latitude,longitude\nLima,Peru,Andes,-12.0,-77.0\n";
        match read_csv(csv.as_bytes()) {
            Err(RadarError::MissingColumn(column)) => assert_eq!(column, "road_quality_index"),
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_value_rejected() {
        let csv = format!(
            "{}\nQuito,Ecuador,Andes,-0.18,-78.46,fair,60,55,50,48,6200,2.8\n",
            HEADER
        );
        assert!(matches!(read_csv(csv.as_bytes()), Err(RadarError::Csv(_))));
    }

    #[test]
    fn test_load_json_with_nulls() {
        let json = r#"[
            {"city": "Manila", "country": "Philippines", "region": "Southeast Asia",
             "latitude": 14.5995, "longitude": 120.9842,
             "road_quality_index": 50, "power_grid_stability": 55, "water_security": null,
             "healthcare_capacity": 52, "disaster_preparedness_score": 47,
             "gdp_per_capita_usd": 3500, "population_millions": 13.5}
        ]"#;
        let file = write_temp(".json", json);

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].country, "Philippines");
        assert!(records[0].water_security.is_nan());
        assert_eq!(records[0].gdp_per_capita_usd, 3500.0);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".xlsx", "not a table");
        assert!(matches!(
            load_records(file.path()),
            Err(RadarError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_bundled_sample() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/city_infrastructure_sample.csv");
        let records = load_csv(path).unwrap();
        assert!(records.len() >= 10);
        assert!(records.iter().all(|r| !r.has_missing_values()));
        assert_eq!(risk_scorer::validate_records(&records), Ok(()));
    }
}
