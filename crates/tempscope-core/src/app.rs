use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::config::ValidationResult;
use crate::Config;

/// Main application state and lifecycle manager
pub struct App {
    config: Arc<Config>,
    validation: ValidationResult,
}

impl App {
    /// Create a new application instance from the default config location
    pub fn new() -> Result<Self> {
        Self::load(None)
    }

    /// Create an application instance from an explicit config file, or the
    /// default location when `config_path` is `None`
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let (config, validation) = Config::load_validated(config_path)?;
        Ok(Self {
            config: Arc::new(config),
            validation,
        })
    }

    /// Wrap an already-loaded configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let validation = config.validate();
        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }
        Ok(Self {
            config: Arc::new(config),
            validation,
        })
    }

    /// Prepare on-disk state (data directory)
    pub fn initialize(&mut self) -> Result<()> {
        tracing::info!(
            data_dir = %self.config.data_dir.display(),
            warnings = self.validation.warnings.len(),
            "Initializing application"
        );

        std::fs::create_dir_all(&self.config.data_dir)
            .context("Failed to create data directory")?;

        tracing::debug!("Application initialized successfully");
        Ok(())
    }

    /// Shutdown the application
    pub fn shutdown(&mut self) -> Result<()> {
        tracing::debug!("Shutting down application");
        Ok(())
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared handle to the config
    pub fn shared_config(&self) -> Arc<Config> {
        self.config.clone()
    }

    /// Warnings produced while validating the config
    pub fn warnings(&self) -> &ValidationResult {
        &self.validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_config_rejects_invalid() {
        let mut config = Config::default();
        config.analysis.window = 0;
        assert!(App::with_config(config).is_err());
    }

    #[test]
    fn test_initialize_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data_dir = dir.path().join("data");

        let mut app = App::with_config(config).unwrap();
        app.initialize().unwrap();
        assert!(dir.path().join("data").is_dir());
        app.shutdown().unwrap();
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            format!(
                "data_dir = \"{}\"\n\n[analysis]\nwindow = 14\nthreshold_std = 2.5\n",
                dir.path().display()
            ),
        )
        .unwrap();

        let app = App::load(Some(&path)).unwrap();
        assert_eq!(app.config().analysis.window, 14);
        assert_eq!(app.config().analysis.threshold_std, 2.5);
    }
}
