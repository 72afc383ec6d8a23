use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tempscope_analysis::{Analyzer, ExecutionStrategy, Season};
use tempscope_core::{App, AppError, ConfigError, OPENWEATHER_API_KEY_ENV};
use tempscope_weather::{
    check_current, current_season, fetch_many, CurrentTemperature, LiveCheck, LiveStatus,
    OpenWeatherClient,
};

use super::analysis::{load_readings, params_from, run_analysis};
use super::{format_temp, print_json};
use crate::error_mapping::{app_error, IntoAppError};

#[derive(Serialize)]
struct CityOutcome {
    city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    check: Option<LiveCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn current(
    app: &App,
    csv: &Path,
    cities: &[String],
    season: Option<Season>,
    json: bool,
) -> Result<()> {
    let weather = &app.config().weather;
    let api_key = weather.resolved_api_key().ok_or_else(|| {
        AppError::Config(ConfigError::MissingSetting(format!(
            "weather.api_key (or {})",
            OPENWEATHER_API_KEY_ENV
        )))
    })?;
    let client = OpenWeatherClient::from_config(weather, api_key).map_err(app_error)?;

    let season = season.unwrap_or_else(current_season);
    let params = params_from(app, None, None);
    params.validate().map_err(app_error)?;

    let mut readings = load_readings(csv)?;
    readings.retain(|r| cities.contains(&r.city));
    let strategy = ExecutionStrategy::with_workers(app.config().analysis.workers);
    let report = run_analysis(Analyzer::new(params, strategy), readings).await?;

    // A single city fails the command; several cities report per city.
    let outcomes: Vec<CityOutcome> = if let [city] = cities {
        let check = check_current(&client, &report, city, season)
            .await
            .map_err(app_error)?;
        vec![CityOutcome {
            city: city.clone(),
            check: Some(check),
            error: None,
        }]
    } else {
        fetch_many(&client, cities)
            .await
            .into_iter()
            .map(|(city, result)| match result {
                Ok(current) => {
                    let range = report.normal_range(&city, season);
                    let status = LiveStatus::from_range(range.as_ref(), current.temperature);
                    CityOutcome {
                        city,
                        check: Some(LiveCheck {
                            current,
                            season,
                            range,
                            status,
                        }),
                        error: None,
                    }
                }
                Err(e) => CityOutcome {
                    city,
                    check: None,
                    error: Some(e.into_app_error().user_message().to_string()),
                },
            })
            .collect()
    };

    if json {
        return print_json(&outcomes);
    }

    println!("\nCurrent temperature vs {} norm", season);
    for outcome in &outcomes {
        match (&outcome.check, &outcome.error) {
            (Some(check), _) => print_check(check),
            (None, Some(error)) => println!("  {:<20} error: {}", outcome.city, error),
            (None, None) => {}
        }
    }
    Ok(())
}

fn print_check(check: &LiveCheck) {
    let CurrentTemperature {
        city, temperature, ..
    } = &check.current;
    match &check.range {
        Some(range) => println!(
            "  {:<20} {:>9}  {} ({} .. {})",
            city,
            format_temp(*temperature),
            check.status.description(),
            format_temp(range.low),
            format_temp(range.high)
        ),
        None => println!(
            "  {:<20} {:>9}  {}",
            city,
            format_temp(*temperature),
            check.status.description()
        ),
    }
}
