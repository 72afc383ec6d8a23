//! Multi-city fetching and live checks against seasonal baselines.

use futures::future::join_all;
use tempscope_analysis::{AnalysisReport, Season};
use tracing::instrument;

use crate::provider::TemperatureSource;
use crate::types::{CurrentTemperature, LiveCheck, LiveStatus, WeatherError};

/// Fetch the current temperature of every city concurrently.
///
/// Each city gets its own result and one failure does not affect the others.
/// Output order matches `cities`.
#[instrument(skip(source), fields(count = cities.len()))]
pub async fn fetch_many(
    source: &dyn TemperatureSource,
    cities: &[String],
) -> Vec<(String, Result<CurrentTemperature, WeatherError>)> {
    let requests = cities.iter().map(|city| async move {
        let result = source.current_temperature(city).await;
        if let Err(e) = &result {
            tracing::warn!(city = %city, error = %e, "Failed to fetch temperature");
        }
        (city.clone(), result)
    });

    join_all(requests).await
}

/// Fetch the live temperature of `city` and classify it against the city's
/// normal range for `season`.
///
/// A missing baseline is not an error: the check is returned with
/// [`LiveStatus::NoBaseline`].
#[instrument(skip(source, report))]
pub async fn check_current(
    source: &dyn TemperatureSource,
    report: &AnalysisReport,
    city: &str,
    season: Season,
) -> Result<LiveCheck, WeatherError> {
    let current = source.current_temperature(city).await?;
    let range = report.normal_range(city, season);
    let status = LiveStatus::from_range(range.as_ref(), current.temperature);

    tracing::info!(
        city,
        %season,
        temperature = current.temperature,
        status = status.description(),
        "Live temperature checked"
    );

    Ok(LiveCheck {
        current,
        season,
        range,
        status,
    })
}
