//! Centralized error types for the tempscope application.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides user-friendly messages suitable for terminal output
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level application error type.
///
/// Errors from the analysis, weather and tracker crates are mapped into this
/// type at the binary boundary. Use `user_message()` for display.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Tracker error: {0}")]
    Tracking(#[from] TrackingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    ///
    /// These messages are designed to be actionable and non-technical.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Database(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Data(e) => e.user_message(),
            AppError::Tracking(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Database/storage errors (SQLite).
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Data corruption detected: {0}")]
    Corruption(String),
}

impl DatabaseError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DatabaseError::ConnectionFailed(_) => {
                "Unable to access local data. Check the database path."
            }
            DatabaseError::QueryFailed(_) => "A data operation failed. Please try again.",
            DatabaseError::Corruption(_) => {
                "Local data may be corrupted. Consider resetting the tracker database."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// Weather service errors.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Weather API error: {0}")]
    ApiError(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::CityNotFound(_) => "City not found. Check the spelling and try again.",
            WeatherError::ApiError(_) => "Weather service error. Please try again.",
            WeatherError::InvalidApiKey => {
                "Weather API key is invalid. See https://openweathermap.org/faq#error401"
            }
            WeatherError::ServiceUnavailable => {
                "Weather service unavailable. Please try again later."
            }
        }
    }
}

/// Errors in temperature data or its analysis.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Data file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid data: {0}")]
    InvalidInput(String),

    #[error("Invalid analysis parameter: {0}")]
    InvalidParameter(String),

    #[error("No data for {0}")]
    NotFound(String),

    #[error("Analysis cancelled")]
    Cancelled,
}

impl DataError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DataError::FileNotFound(_) => "Data file not found. Check the path.",
            DataError::InvalidInput(_) => {
                "The data file is malformed. Expected columns: city, timestamp, temperature, season."
            }
            DataError::InvalidParameter(_) => "Invalid analysis settings. Check window and threshold.",
            DataError::NotFound(_) => "No data found for the requested city or season.",
            DataError::Cancelled => "Analysis was cancelled.",
        }
    }
}

/// Health tracker errors.
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("Profile not found for user {0}")]
    ProfileNotFound(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Food not found: {0}")]
    FoodNotFound(String),
}

impl TrackingError {
    pub fn user_message(&self) -> &'static str {
        match self {
            TrackingError::ProfileNotFound(_) => {
                "Profile not set up. Run `tempscope profile set` first."
            }
            TrackingError::InvalidInput(_) => "Invalid value. Amounts must be positive numbers.",
            TrackingError::FoodNotFound(_) => {
                "Could not find that product. Try an English name or a different product."
            }
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

/// Extension trait for converting rusqlite errors to our error types.
pub trait RusqliteErrorExt {
    fn into_database_error(self) -> DatabaseError;
}

impl RusqliteErrorExt for rusqlite::Error {
    fn into_database_error(self) -> DatabaseError {
        match &self {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("corrupt") => {
                DatabaseError::Corruption(self.to_string())
            }
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::CannotOpen =>
            {
                DatabaseError::ConnectionFailed(self.to_string())
            }
            _ => DatabaseError::QueryFailed(self.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = vec![
            AppError::Network(NetworkError::Timeout),
            AppError::Database(DatabaseError::QueryFailed("test".into())),
            AppError::Config(ConfigError::MissingSetting("weather.api_key".into())),
            AppError::Weather(WeatherError::ServiceUnavailable),
            AppError::Data(DataError::Cancelled),
            AppError::Tracking(TrackingError::ProfileNotFound(1)),
        ];

        for err in errors {
            assert!(!err.user_message().is_empty());
        }
    }

    #[test]
    fn test_app_error_conversion() {
        let err = WeatherError::InvalidApiKey;
        let app_err: AppError = err.into();
        assert!(matches!(app_err, AppError::Weather(WeatherError::InvalidApiKey)));
    }

    #[test]
    fn test_user_message_propagation() {
        let app_err = AppError::Tracking(TrackingError::ProfileNotFound(42));
        assert_eq!(
            app_err.user_message(),
            "Profile not set up. Run `tempscope profile set` first."
        );
    }

    #[test]
    fn test_missing_setting_names_the_key() {
        let err = AppError::Config(ConfigError::MissingSetting(
            "weather.api_key (or OPENWEATHER_API_KEY)".into(),
        ));
        assert!(err.to_string().contains("weather.api_key"));
        assert_eq!(
            err.user_message(),
            "A required setting is missing. Check your settings."
        );
    }

    #[test]
    fn test_server_error_message_depends_on_status() {
        let server = NetworkError::ServerError {
            status: 503,
            message: "down".into(),
        };
        let client = NetworkError::ServerError {
            status: 400,
            message: "bad".into(),
        };
        assert_ne!(server.user_message(), client.user_message());
    }

    #[test]
    fn test_rusqlite_query_error_maps_to_query_failed() {
        let err = rusqlite::Error::QueryReturnedNoRows.into_database_error();
        assert!(matches!(err, DatabaseError::QueryFailed(_)));
    }
}
