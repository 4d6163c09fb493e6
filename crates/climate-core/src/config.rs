use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "CLIMATE_API_CONFIG";
/// Environment variable overriding `database.path`.
pub const DATABASE_PATH_ENV: &str = "CLIMATE_API_DB";
/// Environment variable overriding `server.port`.
pub const PORT_ENV: &str = "CLIMATE_API_PORT";

/// Format of every date stored in the `measurement.date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Summary of all errors, joined with `; `
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// SQLite store settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Reference station window served by `/api/v1.0/tobs`
    #[serde(default)]
    pub tobs: TobsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite file holding `measurement` and `station`
    pub path: PathBuf,

    /// Upper bound for a single query, in milliseconds
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

fn default_query_timeout_ms() -> u64 {
    5_000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("Resources").join("hawaii.sqlite"),
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    pub fn query_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.query_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    /// Parse `host` into an address. Only meaningful after `Config::validate`.
    pub fn ip(&self) -> Result<IpAddr> {
        self.host
            .parse()
            .with_context(|| format!("Invalid server host: {}", self.host))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TobsConfig {
    /// Station whose observations are listed
    pub station: String,

    /// Last day of the window, `YYYY-MM-DD`
    pub reference_date: String,

    /// Length of the trailing window in days
    pub window_days: u32,
}

impl Default for TobsConfig {
    fn default() -> Self {
        Self {
            station: "USC00519281".to_string(),
            reference_date: "2017-08-23".to_string(),
            window_days: 365,
        }
    }
}

impl TobsConfig {
    /// Parsed `reference_date`.
    pub fn reference_date(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.reference_date, DATE_FORMAT)
            .with_context(|| format!("Invalid tobs.reference_date: {}", self.reference_date))
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist.
    ///
    /// Environment overrides are applied after the file is read.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            let config = Self::default();
            if let Err(e) = config.save_to(&config_path) {
                tracing::warn!("Could not write default config to {}: {:#}", config_path.display(), e);
            }
            config
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var(DATABASE_PATH_ENV) {
            self.database.path = PathBuf::from(path);
        }
        if let Ok(port) = std::env::var(PORT_ENV) {
            self.server.port = port
                .parse()
                .with_context(|| format!("{} is not a valid port: {}", PORT_ENV, port))?;
        }
        Ok(())
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.database.path.as_os_str().is_empty() {
            result.add_error("database.path", "Database path must not be empty");
        } else if !self.database.path.exists() {
            result.add_warning(
                "database.path",
                format!("Path does not exist: {}", self.database.path.display()),
            );
        }

        if self.database.query_timeout_ms == 0 {
            result.add_error(
                "database.query_timeout_ms",
                "Query timeout must be greater than 0",
            );
        } else if self.database.query_timeout_ms > 60_000 {
            result.add_warning(
                "database.query_timeout_ms",
                "Query timeout is more than a minute",
            );
        }

        if self.server.host.parse::<IpAddr>().is_err() {
            result.add_error(
                "server.host",
                format!("Not an IP address: {}", self.server.host),
            );
        }

        if self.server.port == 0 {
            result.add_error("server.port", "Port cannot be 0");
        }

        if self.tobs.station.trim().is_empty() {
            result.add_error("tobs.station", "Reference station must not be empty");
        }

        if let Err(e) = self.tobs.reference_date() {
            result.add_error("tobs.reference_date", format!("{:#}", e));
        }

        if self.tobs.window_days == 0 {
            result.add_warning("tobs.window_days", "Window of 0 days covers a single date");
        } else if self.tobs.window_days > 3660 {
            result.add_warning("tobs.window_days", "Window is longer than ten years");
        }

        result
    }

    /// Write configuration to a TOML file, creating parent directories.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("climate-api");

        Ok(config_dir.join("config.toml"))
    }
}
