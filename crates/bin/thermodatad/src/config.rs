//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `thermodata.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;
use thermodata_domain::query::{
    AllowedQueryOptions, DEFAULT_MAX_TOP, QueryOption, QuerySettings,
};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Limits shared by every entity set.
    pub query: QueryConfig,
    /// Per entity set query capabilities.
    pub resources: ResourcesConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Query limits.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Largest accepted `$top`. `0` removes the limit.
    pub max_top: usize,
}

/// Query capabilities of each entity set.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    pub temperature_readings: ResourceConfig,
    pub alerts: ResourceConfig,
}

/// Query capabilities of one entity set.
#[derive(Debug, Deserialize)]
pub struct ResourceConfig {
    pub query_options: QueryOptionsConfig,
}

/// Either a named preset or an explicit list such as `["filter", "expand"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum QueryOptionsConfig {
    Preset(QueryOptionsPreset),
    List(Vec<QueryOption>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryOptionsPreset {
    /// Every supported option.
    All,
    /// `$filter`, `$orderby`, `$select`, `$top` and `$skip`.
    Default,
}

impl QueryOptionsConfig {
    fn allowed(&self) -> AllowedQueryOptions {
        match self {
            Self::Preset(QueryOptionsPreset::All) => AllowedQueryOptions::all(),
            Self::Preset(QueryOptionsPreset::Default) => AllowedQueryOptions::safe(),
            Self::List(options) => options.iter().copied().collect(),
        }
    }
}

impl Config {
    /// Load configuration from `thermodata.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("thermodata.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("THERMODATA_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("THERMODATA_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("THERMODATA_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("THERMODATA_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("THERMODATA_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Query settings for `/TemperatureReadings`.
    #[must_use]
    pub fn reading_query_settings(&self) -> QuerySettings {
        self.query_settings(&self.resources.temperature_readings)
    }

    /// Query settings for `/Alerts`.
    #[must_use]
    pub fn alert_query_settings(&self) -> QuerySettings {
        self.query_settings(&self.resources.alerts)
    }

    fn query_settings(&self, resource: &ResourceConfig) -> QuerySettings {
        QuerySettings {
            allowed: resource.query_options.allowed(),
            max_top: (self.query.max_top > 0).then_some(self.query.max_top),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:thermodata.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "thermodatad=info,thermodata_app=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_top: DEFAULT_MAX_TOP,
        }
    }
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            temperature_readings: ResourceConfig {
                query_options: QueryOptionsConfig::Preset(QueryOptionsPreset::All),
            },
            alerts: ResourceConfig {
                query_options: QueryOptionsConfig::Preset(QueryOptionsPreset::Default),
            },
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
