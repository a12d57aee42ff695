//! Configuration loader with layered sources.

use crate::{AppConfig, DEFAULT_JWT_SECRET, SUPPORTED_JWT_ALGORITHMS};
use config::{Config, ConfigError, Environment, File};
use fourier_core::FourierError;
use std::path::Path;
use tracing::{debug, info, warn};

/// Bare environment variables understood alongside the prefixed ones.
const LEGACY_ENV_KEYS: [(&str, &str); 3] = [
    ("DB_URL", "database.url"),
    ("SECRET_KEY", "security.jwt_secret"),
    ("ALGORITHM", "security.jwt_algorithm"),
];

/// Loads the layered configuration once at startup.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: AppConfig,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `.env` in the working directory (exported into the process env)
    /// 2. `config/default.toml` - Default values
    /// 3. `config/{environment}.toml` - Environment-specific overrides
    /// 4. `config/local.toml` - Uncommitted local overrides
    /// 5. Environment variables with `FOURIER_` prefix and `__` separator
    /// 6. `DB_URL`, `SECRET_KEY` and `ALGORITHM`
    pub fn new(config_dir: impl Into<String>) -> Result<Self, FourierError> {
        let config = Self::load_config(&config_dir.into())?;
        Ok(Self { config })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, FourierError> {
        Self::new("./config")
    }

    /// Returns the loaded configuration.
    #[must_use]
    pub const fn get(&self) -> &AppConfig {
        &self.config
    }

    /// Consumes the loader, yielding the configuration.
    #[must_use]
    pub fn into_config(self) -> AppConfig {
        self.config
    }

    fn load_config(config_dir: &str) -> Result<AppConfig, FourierError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var("FOURIER_ENV").unwrap_or_else(|_| "development".to_string());
        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{config_dir}/{name}.toml");
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("FOURIER")
                .separator("__")
                .try_parsing(true),
        );

        for (var, key) in LEGACY_ENV_KEYS {
            if let Ok(value) = std::env::var(var) {
                debug!("Applying {} from environment", var);
                builder = builder
                    .set_override(key, value)
                    .map_err(config_error_to_fourier_error)?;
            }
        }

        let app_config = builder
            .build()
            .and_then(|config| config.try_deserialize::<AppConfig>())
            .map_err(config_error_to_fourier_error)?;

        validate_config(&app_config)?;

        Ok(app_config)
    }
}

/// Rejects configurations the server cannot start with.
pub fn validate_config(config: &AppConfig) -> Result<(), FourierError> {
    if config.database.url.trim().is_empty() {
        return Err(FourierError::Configuration(
            "Database URL is required".to_string(),
        ));
    }

    if config.security.jwt_secret.is_empty() {
        return Err(FourierError::Configuration(
            "JWT secret must not be empty".to_string(),
        ));
    }

    if !SUPPORTED_JWT_ALGORITHMS.contains(&config.security.jwt_algorithm.as_str()) {
        return Err(FourierError::Configuration(format!(
            "Unsupported JWT algorithm '{}', expected one of {}",
            config.security.jwt_algorithm,
            SUPPORTED_JWT_ALGORITHMS.join(", ")
        )));
    }

    if config.security.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("Using the default JWT secret; set SECRET_KEY or FOURIER_SECURITY__JWT_SECRET");
    }

    Ok(())
}

fn config_error_to_fourier_error(err: ConfigError) -> FourierError {
    FourierError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_loads_toml_layers() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[server]\nport = 9000\n\n[security]\njwt_secret = \"from-default\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("local.toml"),
            "[security]\njwt_secret = \"from-local\"\njwt_algorithm = \"HS512\"\n",
        )
        .unwrap();

        let loader = ConfigLoader::new(dir.path().to_string_lossy().to_string()).unwrap();
        let config = loader.get();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.security.jwt_secret, "from-local");
        assert_eq!(config.security.jwt_algorithm, "HS512");
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_missing_directory_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");

        let config = ConfigLoader::new(missing.to_string_lossy().to_string())
            .unwrap()
            .into_config();
        assert_eq!(config.server.port, AppConfig::default().server.port);
    }

    #[test]
    fn test_invalid_layer_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[security]\njwt_algorithm = \"none\"\n",
        )
        .unwrap();

        let err = ConfigLoader::new(dir.path().to_string_lossy().to_string()).unwrap_err();
        assert!(matches!(err, FourierError::Configuration(_)));
    }

    #[test]
    fn test_rejects_unknown_algorithm() {
        let mut config = AppConfig::default();
        config.security.jwt_algorithm = "RS256".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, FourierError::Configuration(_)));
    }

    #[test]
    fn test_rejects_empty_database_url() {
        let mut config = AppConfig::default();
        config.database.url = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_empty_secret() {
        let mut config = AppConfig::default();
        config.security.jwt_secret = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }
}
