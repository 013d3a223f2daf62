//! # Configuration
//!
//! `AppConfig` is built once at startup from, in increasing priority:
//! built-in defaults, an optional `directory.toml` file, and `DIRECTORY__*`
//! environment variables (`DIRECTORY__DATABASE__URL`, `DIRECTORY__SERVER__PORT`, ...).
//! A `.env` file is loaded into the environment first when present.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::StartupError;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub pagination: PaginationConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load and validate configuration from file and environment.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::Config`] when a source cannot be read or
    /// deserialized, and [`StartupError::InvalidConfig`] when validation fails.
    pub fn load() -> Result<Self, StartupError> {
        // a missing .env is normal outside development
        let _ = dotenvy::dotenv();

        let settings = config::Config::builder()
            .add_source(config::File::with_name("directory").required(false))
            .add_source(
                config::Environment::with_prefix("DIRECTORY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`StartupError::InvalidConfig`] naming the first invalid setting.
    pub fn validate(&self) -> Result<(), StartupError> {
        if self.server.port == 0 {
            return Err(StartupError::invalid("server.port must be non-zero"));
        }
        if self.database.url.trim().is_empty() {
            return Err(StartupError::invalid("database.url cannot be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(StartupError::invalid("database.max_connections must be at least 1"));
        }
        if self.pagination.max_page_size == 0 {
            return Err(StartupError::invalid("pagination.max_page_size must be at least 1"));
        }
        if i64::try_from(self.pagination.max_page_size).is_err() {
            return Err(StartupError::invalid(
                "pagination.max_page_size must fit a signed 64-bit LIMIT",
            ));
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL (`postgres://`, `mysql://` or `sqlite:`)
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
    /// Create missing tables from the entity definitions at startup
    pub auto_create_schema: bool,
    /// Log every SQL statement at debug level
    pub sql_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://directory.db?mode=rwc".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_seconds: 10,
            auto_create_schema: true,
            sql_logging: false,
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Upper bound applied to the `pageSize` query parameter
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { max_page_size: 100 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,sqlx=warn".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.pagination.max_page_size, 100);
        assert_eq!(config.database.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_zero_page_cap_rejected() {
        let mut config = AppConfig::default();
        config.pagination.max_page_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_page_size"));
    }

    #[test]
    fn test_page_cap_beyond_signed_limit_rejected() {
        let mut config = AppConfig::default();
        config.pagination.max_page_size = i64::MAX.unsigned_abs() + 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_page_size"));

        config.pagination.max_page_size = i64::MAX.unsigned_abs();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_database_url_rejected() {
        let mut config = AppConfig::default();
        config.database.url = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_sources_fill_defaults() {
        let settings = config::Config::builder()
            .set_override("server.port", 9090)
            .unwrap()
            .set_override("logging.format", "json")
            .unwrap()
            .build()
            .unwrap();
        let config: AppConfig = settings.try_deserialize().unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.database.auto_create_schema);
    }
}
