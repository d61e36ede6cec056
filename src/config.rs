use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HISTORY_PAGE_SIZE: usize = 25;
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1024;
const CONFIG_DIR: &str = "config";

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    #[validate(range(min = 1, max = 65535, message = "port must be between 1 and 65535"))]
    pub port: u16,

    /// Application environment
    #[validate(length(min = 1, message = "environment must not be empty"))]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Rows per page of the history table
    #[serde(default = "default_history_page_size")]
    #[validate(range(min = 1, max = 500, message = "history_page_size must be between 1 and 500"))]
    pub history_page_size: usize,

    /// Capacity of the internal event channel
    #[serde(default = "default_event_channel_capacity")]
    #[validate(custom = "validate_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Comma-separated origins allowed by CORS
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow any origin outside development
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    /// Account created at startup for local runs
    #[serde(default)]
    pub demo_user_email: Option<String>,

    #[serde(default)]
    pub demo_user_password: Option<String>,
}

impl AppConfig {
    /// Creates a new configuration with defaults for everything but the
    /// listen address and environment
    pub fn new(host: String, port: u16, environment: String) -> Self {
        Self {
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            history_page_size: default_history_page_size(),
            event_channel_capacity: default_event_channel_capacity(),
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            demo_user_email: None,
            demo_user_password: None,
        }
    }

    /// Checks if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Origins listed in `cors_allowed_origins`
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Whether we should fall back to permissive CORS
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    /// Demo credentials, when both halves are configured
    pub fn demo_user(&self) -> Option<(&str, &str)> {
        match (&self.demo_user_email, &self.demo_user_password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST.to_string(), DEFAULT_PORT, DEFAULT_ENV.to_string())
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_history_page_size() -> usize {
    DEFAULT_HISTORY_PAGE_SIZE
}

fn default_event_channel_capacity() -> usize {
    DEFAULT_EVENT_CHANNEL_CAPACITY
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_event_channel_capacity(capacity: usize) -> Result<(), ValidationError> {
    if capacity == 0 {
        let mut err = ValidationError::new("event_channel_capacity");
        err.message = Some("event_channel_capacity must be greater than 0".into());
        return Err(err);
    }
    Ok(())
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("home_inventory={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let filter = EnvFilter::new(filter_directive);
    if json {
        let _ = fmt().with_env_filter(filter).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    load_config_from(Path::new(CONFIG_DIR), &run_env)
}

/// Loads configuration from an explicit directory and profile
pub fn load_config_from(config_dir: &Path, run_env: &str) -> Result<AppConfig, AppConfigError> {
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let config = Config::builder()
        .set_default("host", DEFAULT_HOST)?
        .set_default("port", i64::from(DEFAULT_PORT))?
        .set_default("environment", run_env)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::from(config_dir.join("default")).required(false))
        .add_source(File::from(config_dir.join(run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::TempDir;

    fn config_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn defaults_apply_without_files() {
        let dir = config_dir(&[]);
        let config = load_config_from(&dir.path().join("missing"), "test").unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.environment, "test");
        assert_eq!(config.history_page_size, 25);
        assert_eq!(config.event_channel_capacity, DEFAULT_EVENT_CHANNEL_CAPACITY);
    }

    #[test]
    fn profile_file_overrides_default_file() {
        let dir = config_dir(&[
            ("default.toml", "port = 9000\nlog_level = \"debug\"\n"),
            ("staging.toml", "port = 9100\nlog_json = true\n"),
        ]);
        let config = load_config_from(dir.path(), "staging").unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.log_level, "debug");
        assert!(config.log_json);
    }

    #[test]
    fn invalid_values_fail_validation() {
        let dir = config_dir(&[(
            "default.toml",
            "log_level = \"loud\"\nhistory_page_size = 0\nevent_channel_capacity = 0\n",
        )]);
        let result = load_config_from(dir.path(), "validation");
        assert_matches!(result, Err(AppConfigError::Validation(_)));
        if let Err(AppConfigError::Validation(errors)) = result {
            let fields = errors.field_errors();
            assert!(fields.contains_key("log_level"));
            assert!(fields.contains_key("history_page_size"));
            assert!(fields.contains_key("event_channel_capacity"));
        }
    }

    #[test]
    fn cors_and_demo_helpers() {
        let mut config = AppConfig::new("127.0.0.1".into(), 8080, "production".into());
        assert!(!config.should_allow_permissive_cors());
        config.cors_allowed_origins = Some("https://a.example, ,https://b.example".into());
        assert_eq!(
            config.cors_origins(),
            vec!["https://a.example", "https://b.example"]
        );

        config.demo_user_email = Some("demo@example.com".into());
        assert_eq!(config.demo_user(), None);
        config.demo_user_password = Some("demo1234".into());
        assert_eq!(config.demo_user(), Some(("demo@example.com", "demo1234")));
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }
}
