use tempscope_core::error::ReqwestErrorExt;
use tempscope_core::{AppError, NetworkError, WeatherError as CoreWeatherError};
use tempscope_weather::WeatherError;

use super::IntoAppError;

impl IntoAppError for WeatherError {
    fn into_app_error(self) -> AppError {
        match self {
            WeatherError::InvalidApiKey => AppError::Weather(CoreWeatherError::InvalidApiKey),
            WeatherError::CityNotFound(city) => {
                AppError::Weather(CoreWeatherError::CityNotFound(city))
            }
            WeatherError::Api { status, .. } if status == 503 => {
                AppError::Weather(CoreWeatherError::ServiceUnavailable)
            }
            WeatherError::Api { status, message } => {
                AppError::Network(NetworkError::ServerError { status, message })
            }
            WeatherError::Timeout => AppError::Network(NetworkError::Timeout),
            WeatherError::Network(e) => AppError::Network(e.into_network_error()),
            WeatherError::Parse(s) => AppError::Weather(CoreWeatherError::ApiError(s)),
        }
    }
}
