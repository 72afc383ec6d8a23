use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Meteorological season of a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Autumn];

    /// Season for a calendar month (1-12), northern-hemisphere convention.
    /// Months outside 1..=12 yield `None`.
    pub fn from_month(month: u32) -> Option<Self> {
        match month {
            12 | 1 | 2 => Some(Self::Winter),
            3..=5 => Some(Self::Spring),
            6..=8 => Some(Self::Summer),
            9..=11 => Some(Self::Autumn),
            _ => None,
        }
    }

    /// Season a given date falls in
    pub fn of_date(date: NaiveDate) -> Self {
        // chrono months are always 1..=12
        Self::from_month(date.month()).unwrap_or(Self::Winter)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Winter => "winter",
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name one of the four seasons
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown season: {0}")]
pub struct ParseSeasonError(pub String);

impl FromStr for Season {
    type Err = ParseSeasonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "winter" => Ok(Self::Winter),
            "spring" => Ok(Self::Spring),
            "summer" => Ok(Self::Summer),
            "autumn" | "fall" => Ok(Self::Autumn),
            _ => Err(ParseSeasonError(s.to_string())),
        }
    }
}

/// One city/day/temperature/season observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub city: String,
    pub timestamp: NaiveDate,
    /// Daily mean temperature in °C
    pub temperature: f64,
    pub season: Season,
}

impl Reading {
    pub fn new(city: impl Into<String>, timestamp: NaiveDate, temperature: f64, season: Season) -> Self {
        Self {
            city: city.into(),
            timestamp,
            temperature,
            season,
        }
    }
}

/// A reading together with its smoothed value and anomaly flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedPoint {
    pub reading: Reading,
    /// Centered moving average; `None` where the window does not fit
    pub moving_average: Option<f64>,
    /// Always `false` where `moving_average` is `None`
    pub is_anomaly: bool,
}

impl AnalyzedPoint {
    /// Observed temperature minus the moving average, where defined
    pub fn residual(&self) -> Option<f64> {
        self.moving_average.map(|ma| self.reading.temperature - ma)
    }
}

/// Time-ordered analysis of one city's readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedSeries {
    pub city: String,
    pub points: Vec<AnalyzedPoint>,
    pub anomaly_count: usize,
    pub total_count: usize,
}

impl AnalyzedSeries {
    /// Iterate over the points flagged as anomalies
    pub fn anomalies(&self) -> impl Iterator<Item = &AnalyzedPoint> {
        self.points.iter().filter(|p| p.is_anomaly)
    }
}

/// Mean and standard deviation of temperature for one (city, season)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalBaseline {
    pub mean_temp: f64,
    /// Sample standard deviation; 0 for a single reading
    pub std_temp: f64,
    pub count: usize,
}

impl SeasonalBaseline {
    /// Envelope of mean ± 2σ
    pub fn normal_range(&self) -> NormalRange {
        NormalRange {
            low: self.mean_temp - 2.0 * self.std_temp,
            high: self.mean_temp + 2.0 * self.std_temp,
        }
    }
}

/// Seasonal baselines of a single city, keyed by season
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeasonalBaselines {
    pub city: String,
    pub by_season: BTreeMap<Season, SeasonalBaseline>,
}

impl SeasonalBaselines {
    pub fn get(&self, season: Season) -> Option<&SeasonalBaseline> {
        self.by_season.get(&season)
    }

    /// Normal range for a season, or `None` when the city has no readings
    /// in that season.
    pub fn normal_range(&self, season: Season) -> Option<NormalRange> {
        self.get(season).map(SeasonalBaseline::normal_range)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Season, &SeasonalBaseline)> {
        self.by_season.iter().map(|(s, b)| (*s, b))
    }
}

/// Where an observed temperature sits relative to a normal range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeStatus {
    Below,
    Normal,
    Above,
}

/// Inclusive `[low, high]` temperature envelope for a city and season
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalRange {
    pub low: f64,
    pub high: f64,
}

impl NormalRange {
    pub fn contains(&self, temperature: f64) -> bool {
        self.low <= temperature && temperature <= self.high
    }

    pub fn classify(&self, temperature: f64) -> RangeStatus {
        if temperature < self.low {
            RangeStatus::Below
        } else if temperature > self.high {
            RangeStatus::Above
        } else {
            RangeStatus::Normal
        }
    }
}

/// Headline numbers for one city
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub anomaly_count: usize,
}

/// Full analysis result for one city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityAnalysis {
    pub series: AnalyzedSeries,
    pub baselines: SeasonalBaselines,
    pub summary: TemperatureSummary,
}

/// Analysis results for every city in a dataset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub cities: BTreeMap<String, CityAnalysis>,
}

impl AnalysisReport {
    pub fn city(&self, city: &str) -> Option<&CityAnalysis> {
        self.cities.get(city)
    }

    /// Normal range for a (city, season) pair, `None` if either is unknown.
    pub fn normal_range(&self, city: &str, season: Season) -> Option<NormalRange> {
        self.city(city)?.baselines.normal_range(season)
    }

    pub fn city_names(&self) -> impl Iterator<Item = &str> {
        self.cities.keys().map(String::as_str)
    }

    pub fn total_anomalies(&self) -> usize {
        self.cities.values().map(|c| c.series.anomaly_count).sum()
    }

    pub fn total_readings(&self) -> usize {
        self.cities.values().map(|c| c.series.total_count).sum()
    }
}
