use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    /// Maximum connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    /// Page size used when the caller does not pass one
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    /// Hard cap on page size
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

fn default_limit() -> u32 {
    20
}

fn default_max_limit() -> u32 {
    100
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Buffer size of the in-process broadcast channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Also append events to the `load_events` table
    #[serde(default)]
    pub persist: bool,
}

fn default_channel_capacity() -> usize {
    1024
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            persist: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("database.max_connections", 5)?
            .set_default("listing.default_limit", 20)?
            .set_default("listing.max_limit", 100)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Environment-specific overrides, e.g. config/production.toml
            .add_source(
                File::from(config_dir.join(
                    std::env::var("FREIGHT_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // FREIGHT_DATABASE__URL, FREIGHT_LISTING__MAX_LIMIT, ...
            .add_source(
                Environment::with_prefix("FREIGHT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Configuration for in-memory runs (demo, tests)
    pub fn default_config() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgres://localhost/freight".to_string(),
                max_connections: default_max_connections(),
            },
            listing: ListingConfig::default(),
            events: EventsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.database.url.trim().is_empty() {
            errors.push("database.url must be set".to_string());
        }

        if self.database.max_connections == 0 {
            errors.push("database.max_connections must be positive".to_string());
        }

        if self.listing.max_limit == 0 {
            errors.push("listing.max_limit must be positive".to_string());
        }

        if self.listing.default_limit == 0 || self.listing.default_limit > self.listing.max_limit
        {
            errors.push(format!(
                "listing.default_limit must be between 1 and max_limit ({})",
                self.listing.max_limit
            ));
        }

        if self.events.channel_capacity == 0 {
            errors.push("events.channel_capacity must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
