//! Configuration loader with layered sources.

use crate::AppConfig;
use config::{Config, ConfigError, Environment, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strata_core::StrataError;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Environment variable selecting the environment-specific config file.
pub const ENVIRONMENT_VAR: &str = "STRATA_ENVIRONMENT";

/// Configuration loader with runtime reload support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: PathBuf,
    environment: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Sources, later ones overriding earlier ones:
    /// 1. `{dir}/default.toml`
    /// 2. `{dir}/{environment}.toml`, environment taken from `STRATA_ENVIRONMENT`
    ///    (default `development`)
    /// 3. `{dir}/local.toml`
    /// 4. Environment variables such as `STRATA_DATABASE__URL`
    pub fn new(config_dir: impl Into<PathBuf>) -> Result<Self, StrataError> {
        // Load .env file if present, so STRATA_ENVIRONMENT can come from it
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment = std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| "development".to_string());
        Self::with_environment(config_dir, environment)
    }

    /// Creates a loader for an explicit environment name.
    pub fn with_environment(
        config_dir: impl Into<PathBuf>,
        environment: impl Into<String>,
    ) -> Result<Self, StrataError> {
        let config_dir = config_dir.into();
        let environment = environment.into();
        let config = Self::load_config(&config_dir, &environment)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
            environment,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, StrataError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Returns the environment this loader was created for.
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Reloads the configuration from disk.
    ///
    /// On failure the previous configuration stays in place.
    pub async fn reload(&self) -> Result<(), StrataError> {
        let new_config = Self::load_config(&self.config_dir, &self.environment)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    fn load_config(config_dir: &Path, environment: &str) -> Result<AppConfig, StrataError> {
        info!(
            "Loading configuration for environment: {} from {}",
            environment,
            config_dir.display()
        );

        let mut builder = Config::builder();

        for name in ["default", environment, "local"] {
            let path = config_dir.join(format!("{}.toml", name));
            if path.exists() {
                debug!("Loading config from: {}", path.display());
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("STRATA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_error_to_strata_error)?;

        let app_config: AppConfig = config
            .try_deserialize()
            .map_err(config_error_to_strata_error)?;

        Self::validate_config(&app_config)?;

        Ok(app_config)
    }

    fn validate_config(config: &AppConfig) -> Result<(), StrataError> {
        if config.app.environment == "production" && config.database.log_queries {
            warn!("SQL query logging is enabled in production");
        }

        config.database.validate()
    }

    /// Gets a specific configuration value by dotted key path.
    pub async fn get_value<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let config = self.config.read().await;
        let json = serde_json::to_value(&*config).ok()?;

        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }

        serde_json::from_value(current.clone()).ok()
    }
}

fn config_error_to_strata_error(err: ConfigError) -> StrataError {
    StrataError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_directory_falls_back_to_defaults() {
        let loader = ConfigLoader::with_environment("./does-not-exist", "test").unwrap();
        let config = loader.get().await;
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(loader.environment(), "test");
    }

    #[tokio::test]
    async fn test_get_value_by_path() {
        let loader = ConfigLoader::with_environment("./does-not-exist", "test").unwrap();
        let timeout: Option<u64> = loader.get_value("database.connect_timeout_secs").await;
        assert_eq!(timeout, Some(30));

        let missing: Option<u64> = loader.get_value("database.nope").await;
        assert!(missing.is_none());
    }
}
