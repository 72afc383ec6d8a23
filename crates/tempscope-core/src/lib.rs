pub mod app;
pub mod config;
pub mod error;
pub mod retry;

pub use app::App;
pub use config::{
    AnalysisConfig, Config, TrackerConfig, ValidationResult, WeatherConfig, OPENWEATHER_API_KEY_ENV,
};
pub use error::{
    AppError, ConfigError, DataError, DatabaseError, NetworkError, TrackingError, WeatherError,
};
pub use retry::{with_retry, RetryPolicy};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Tempscope core initialized");
    Ok(())
}
