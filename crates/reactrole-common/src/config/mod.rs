//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, BotConfig, ConfigError, DatabaseConfig, GatewayConfig, LoggingConfig,
};
