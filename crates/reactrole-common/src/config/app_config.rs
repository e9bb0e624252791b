//! Application configuration structs
//!
//! Loads configuration from an optional config file and `REACTROLE__*`
//! environment variables, in that order of precedence (env wins).

use std::time::Duration;

use config::{Config, ConfigBuilder, Environment, File};
use reactrole_core::Snowflake;
use serde::Deserialize;

/// Prefix for environment overrides, e.g. `REACTROLE__BOT__TOKEN`
const ENV_PREFIX: &str = "REACTROLE";

/// Config file looked up when `REACTROLE_CONFIG` is unset (any supported extension)
const DEFAULT_CONFIG_FILE: &str = "bot";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub bot: BotConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Bot behaviour settings
#[derive(Clone, Deserialize)]
pub struct BotConfig {
    pub token: String,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// Roles allowed to issue commands; empty means anyone
    #[serde(default)]
    pub command_role_ids: Vec<Snowflake>,
    #[serde(default = "default_event_timeout_secs")]
    pub event_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub restore_reactions_on_ready: bool,
}

// Hand-written so the token never ends up in logs
impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("command_prefix", &self.command_prefix)
            .field("command_role_ids", &self.command_role_ids)
            .field("event_timeout_secs", &self.event_timeout_secs)
            .field("restore_reactions_on_ready", &self.restore_reactions_on_ready)
            .finish()
    }
}

impl BotConfig {
    #[must_use]
    pub fn event_timeout(&self) -> Duration {
        Duration::from_secs(self.event_timeout_secs)
    }
}

/// Chat platform endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_url")]
    pub url: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            api_base: default_api_base(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. "info" or "info,sqlx=warn"
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    /// Log every store statement with its duration at debug level
    #[serde(default)]
    pub database: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            database: false,
        }
    }
}

// Default value functions
fn default_command_prefix() -> String {
    "?".to_string()
}

fn default_event_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_gateway_url() -> String {
    "wss://gateway.discord.gg/?v=10&encoding=json".to_string()
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from the config file and environment
    ///
    /// The file is `$REACTROLE_CONFIG` if set, otherwise `bot.{toml,json,yaml}`
    /// in the working directory; it is optional.
    ///
    /// # Errors
    /// Returns an error if a required key is missing or a value is malformed
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let path = std::env::var("REACTROLE_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let builder = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("bot.command_role_ids")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    fn from_builder(
        builder: ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot
    ///
    /// # Errors
    /// Returns the first invalid key
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.token.trim().is_empty() {
            return Err(ConfigError::MissingVar("bot.token"));
        }
        if self.bot.command_prefix.is_empty() {
            return Err(ConfigError::InvalidValue(
                "bot.command_prefix",
                "must not be empty".to_string(),
            ));
        }
        if self.bot.event_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "bot.event_timeout_secs",
                "must be at least 1".to_string(),
            ));
        }
        if self.database.url.is_empty() {
            return Err(ConfigError::MissingVar("database.url"));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::InvalidValue(
                "database.min_connections",
                format!(
                    "{} exceeds max_connections {}",
                    self.database.min_connections, self.database.max_connections
                ),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}
