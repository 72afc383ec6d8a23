//! Loading readings from CSV.
//!
//! Expected columns are `city`, `timestamp`, `temperature` and `season`, in
//! any order; extra columns are ignored. Rows are validated here so the
//! analysis pipeline can assume well-typed input.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::IngestError;
use crate::types::{Reading, Season};

const COLUMNS: [&str; 4] = ["city", "timestamp", "temperature", "season"];

/// Load all readings from a CSV file.
pub fn load_csv(path: &Path) -> Result<Vec<Reading>, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let readings = read_csv(BufReader::new(file))?;
    tracing::info!(
        path = %path.display(),
        records = readings.len(),
        "Loaded temperature data"
    );
    Ok(readings)
}

/// Parse readings from any CSV source with a header row.
pub fn read_csv<R: Read>(source: R) -> Result<Vec<Reading>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let mut indices = [0usize; 4];
    for (slot, name) in indices.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or(IngestError::MissingColumn(name))?;
    }
    let [city_idx, ts_idx, temp_idx, season_idx] = indices;

    let mut readings = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let city = field(city_idx);
        if city.is_empty() {
            return Err(invalid(line, "city is empty"));
        }

        let timestamp = parse_date(field(ts_idx))
            .ok_or_else(|| invalid(line, format!("invalid timestamp '{}'", field(ts_idx))))?;

        let temperature = field(temp_idx)
            .parse::<f64>()
            .ok()
            .filter(|t| t.is_finite())
            .ok_or_else(|| invalid(line, format!("invalid temperature '{}'", field(temp_idx))))?;

        let season: Season = field(season_idx)
            .parse()
            .map_err(|e| invalid(line, format!("{}", e)))?;

        readings.push(Reading::new(city, timestamp, temperature, season));
    }

    Ok(readings)
}

fn invalid(line: u64, message: impl Into<String>) -> IngestError {
    IngestError::InvalidRecord {
        line,
        message: message.into(),
    }
}

/// Accepts a plain date or a datetime, keeping only the date part.
fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Overview of a loaded dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub records: usize,
    pub cities: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl DatasetSummary {
    pub fn from_readings(readings: &[Reading]) -> Self {
        let cities: BTreeSet<&str> = readings.iter().map(|r| r.city.as_str()).collect();
        Self {
            records: readings.len(),
            cities: cities.len(),
            first_date: readings.iter().map(|r| r.timestamp).min(),
            last_date: readings.iter().map(|r| r.timestamp).max(),
        }
    }
}
