use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempscope_analysis::{NormalRange, RangeStatus, Season};

/// Current temperature reported for a city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentTemperature {
    pub city: String,
    /// Temperature in °C
    pub temperature: f64,
    pub fetched_at: DateTime<Utc>,
}

/// Outcome of comparing a live temperature with the seasonal norm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveStatus {
    Normal,
    BelowNormal,
    AboveNormal,
    /// No historical readings for this city and season
    NoBaseline,
}

impl LiveStatus {
    pub fn from_range(range: Option<&NormalRange>, temperature: f64) -> Self {
        match range.map(|r| r.classify(temperature)) {
            Some(RangeStatus::Normal) => Self::Normal,
            Some(RangeStatus::Below) => Self::BelowNormal,
            Some(RangeStatus::Above) => Self::AboveNormal,
            None => Self::NoBaseline,
        }
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Normal => "within the seasonal norm",
            Self::BelowNormal => "below the seasonal norm",
            Self::AboveNormal => "above the seasonal norm",
            Self::NoBaseline => "no seasonal baseline available",
        }
    }
}

/// A live temperature classified against a city's seasonal baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveCheck {
    pub current: CurrentTemperature,
    pub season: Season,
    pub range: Option<NormalRange>,
    pub status: LiveStatus,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("City not found: {0}")]
    CityNotFound(String),
    #[error("Weather API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    /// Classify a transport-level failure
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(error)
        }
    }
}
