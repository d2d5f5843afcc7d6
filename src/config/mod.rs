use serde::Deserialize;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;
use thiserror::Error;


pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_SESSION_FILE: &str = "./data/session.json";
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: f64 = 10.0;
pub const DEFAULT_LOG_LEVEL: &str = "INFO";
pub const DEFAULT_LOG_FORMAT: &str = "plain";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Validation error: {0}")]
    Validation(String),
}

fn default_user_agent() -> String {
    format!("condo-console/{}", env!("CARGO_PKG_VERSION"))
}

/// Client settings with environment variable support
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    // Backend
    pub api_base_url: String,
    pub http_timeout_seconds: f64,
    pub user_agent: String,

    // Session persistence
    pub session_file: PathBuf,

    // Unauthenticated entry point
    pub login_path: String,

    // Logging
    pub log_level: String,
    pub log_format: String,
}

impl Settings {
    /// Create new settings instance from environment variables and .env file
    pub fn new() -> Result<Self, ConfigError> {
        Self::new_with_env_file(true)
    }

    /// Create new settings instance with optional .env file loading
    pub fn new_with_env_file(load_env_file: bool) -> Result<Self, ConfigError> {
        // Tests mutate process env; serialize reads so each build sees one snapshot
        static SETTINGS_BUILD_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        let build_mutex = SETTINGS_BUILD_MUTEX.get_or_init(|| Mutex::new(()));
        let _guard = build_mutex
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        #[cfg(not(test))]
        {
            if load_env_file {
                dotenvy::dotenv().ok();
            }
        }
        #[cfg(test)]
        let _ = load_env_file;

        let mut builder = config::Config::builder()
            .set_default("api_base_url", DEFAULT_API_BASE_URL)?
            .set_default("http_timeout_seconds", DEFAULT_HTTP_TIMEOUT_SECONDS)?
            .set_default("user_agent", default_user_agent())?
            .set_default("session_file", DEFAULT_SESSION_FILE)?
            .set_default("login_path", DEFAULT_LOGIN_PATH)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .set_default("log_format", DEFAULT_LOG_FORMAT)?;

        fn read_env(key: &str) -> Option<String> {
            std::env::var(key).ok()
        }

        // String overrides (UPPERCASE only)
        if let Some(v) = read_env("CONDO_API_URL") { builder = builder.set_override("api_base_url", v)?; }
        if let Some(v) = read_env("CONDO_USER_AGENT") { builder = builder.set_override("user_agent", v)?; }
        if let Some(v) = read_env("CONDO_SESSION_FILE") { builder = builder.set_override("session_file", v)?; }
        if let Some(v) = read_env("CONDO_LOGIN_PATH") { builder = builder.set_override("login_path", v)?; }
        if let Some(v) = read_env("LOG_LEVEL") { builder = builder.set_override("log_level", v)?; }
        if let Some(v) = read_env("LOG_FORMAT") { builder = builder.set_override("log_format", v)?; }

        // Numeric overrides
        if let Some(v) = read_env("HTTP_TIMEOUT_SECONDS").and_then(|s| s.parse::<f64>().ok()) { builder = builder.set_override("http_timeout_seconds", v)?; }

        let mut settings: Settings = builder.build()?.try_deserialize()?;
        settings.api_base_url = normalize_base_url(&settings.api_base_url);

        settings.validate()?;

        Ok(settings)
    }

    /// Settings pointed at a specific backend, everything else at its default.
    pub fn for_api(api_base_url: &str) -> Self {
        Self {
            api_base_url: normalize_base_url(api_base_url),
            ..Self::default()
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.http_timeout_seconds)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.is_empty() {
            return Err(ConfigError::Validation(
                "api_base_url must not be empty".to_string(),
            ));
        }

        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "api_base_url must be an http:// or https:// URL".to_string(),
            ));
        }

        if self.http_timeout_seconds <= 0.0 || !self.http_timeout_seconds.is_finite() {
            return Err(ConfigError::Validation(
                "http_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if !self.login_path.starts_with('/') {
            return Err(ConfigError::Validation(
                "login_path must start with '/'".to_string(),
            ));
        }

        if !matches!(self.log_format.as_str(), "json" | "plain") {
            return Err(ConfigError::Validation(
                "log_format must be 'json' or 'plain'".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
            user_agent: default_user_agent(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

/// Trim whitespace and any trailing slashes from the API base URL.
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
