//! Current-temperature provider backed by the OpenWeatherMap API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tempscope_core::{with_retry, RetryPolicy, WeatherConfig};
use tracing::instrument;

use crate::types::{CurrentTemperature, WeatherError};

const DEFAULT_API_URL: &str = "https://api.openweathermap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

/// Anything that can report the current temperature of a city.
///
/// Implementations must be safe to call concurrently; each call succeeds or
/// fails on its own.
#[async_trait]
pub trait TemperatureSource: Send + Sync {
    async fn current_temperature(&self, city: &str) -> Result<CurrentTemperature, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    main: Option<OwmMain>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwmErrorBody {
    message: Option<String>,
}

/// OpenWeatherMap client (metric units)
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl OpenWeatherClient {
    /// Client for the public API with the default timeout
    pub fn new(api_key: impl Into<String>) -> Result<Self, WeatherError> {
        Self::with_options(
            api_key,
            DEFAULT_API_URL,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
            RetryPolicy::default(),
        )
    }

    pub fn with_options(
        api_key: impl Into<String>,
        base_url: &str,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(WeatherError::from_transport)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            retry,
        })
    }

    /// Build a client from the weather section of the app config
    pub fn from_config(config: &WeatherConfig, api_key: impl Into<String>) -> Result<Self, WeatherError> {
        Self::with_options(
            api_key,
            &config.api_url,
            Duration::from_secs(config.timeout_secs),
            config.retry_policy(),
        )
    }

    /// Fetch the current temperature for `city`.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(&self, city: &str) -> Result<CurrentTemperature, WeatherError> {
        let url = format!("{}{}", self.base_url, CURRENT_WEATHER_PATH);
        let query = [("q", city), ("appid", self.api_key.as_str()), ("units", "metric")];

        let response = with_retry(&self.retry, || {
            self.client.get(&url).query(&query).send()
        })
        .await
        .map_err(WeatherError::from_transport)?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => return Err(WeatherError::InvalidApiKey),
            StatusCode::NOT_FOUND => return Err(WeatherError::CityNotFound(city.to_string())),
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<OwmErrorBody>(&body)
                    .ok()
                    .and_then(|b| b.message)
                    .unwrap_or(body);
                return Err(WeatherError::Api {
                    status: s.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        let body: OwmResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        let temperature = body
            .main
            .map(|m| m.temp)
            .ok_or_else(|| WeatherError::Parse("Response has no main.temp".to_string()))?;

        tracing::debug!(
            city,
            reported_name = body.name.as_deref().unwrap_or(""),
            temperature,
            "Fetched current temperature"
        );

        Ok(CurrentTemperature {
            city: city.to_string(),
            temperature,
            fetched_at: Utc::now(),
        })
    }
}

#[async_trait]
impl TemperatureSource for OpenWeatherClient {
    async fn current_temperature(&self, city: &str) -> Result<CurrentTemperature, WeatherError> {
        self.fetch(city).await
    }
}
