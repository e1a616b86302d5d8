use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_EVENT_BUFFER_SIZE: usize = 1024;
const CONFIG_DIR: &str = "config";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Capacity of the bounded domain-event channel
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            event_buffer_size: default_event_buffer_size(),
        }
    }
}

impl AppConfig {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_event_buffer_size() -> usize {
    DEFAULT_EVENT_BUFFER_SIZE
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new("invalid_log_level")),
    }
}

/// Loads configuration from layered sources: defaults, `config/default`,
/// `config/<environment>`, then `APP__*` environment variables.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let environment = env::var("APP_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let cfg: AppConfig = Config::builder()
        .set_default("environment", environment.clone())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("event_buffer_size", DEFAULT_EVENT_BUFFER_SIZE as i64)?
        .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
        .add_source(File::with_name(&format!("{CONFIG_DIR}/{environment}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()?;

    cfg.validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {e}")))?;

    Ok(cfg)
}

/// Initializes the global tracing subscriber. Safe to call more than once;
/// subsequent calls are no-ops.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("fleet_api={level}");
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let filter =
        EnvFilter::try_new(filter_directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if json {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.log_level(), "info");
        assert!(!cfg.is_production());
        assert_eq!(cfg.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
    }

    #[test]
    fn bogus_log_level_is_rejected() {
        let cfg = AppConfig {
            log_level: "loud".to_string(),
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
