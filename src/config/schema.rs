//! Configuration schema types
//!
//! Maps one-to-one onto the TOML file. Every section validates itself and
//! reports the first offending key.

use crate::config::SecretString;
use crate::core::schedule::ScheduleConfiguration;
use serde::{Deserialize, Serialize};
use url::Url;

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotwiseConfig {
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Clinic REST API connection
    pub api: ApiConfig,

    /// Operating hours, breaks and placement policy
    #[serde(default)]
    pub schedule: ScheduleConfiguration,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SlotwiseConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.api.validate(&self.environment)?;
        self.schedule.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Walk the workflow but never call create/update endpoints
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Backoff for idempotent requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 {
            return Err("api.retry.max_retries must be > 0".to_string());
        }
        if self.backoff_multiplier < 1.0 {
            return Err("api.retry.backoff_multiplier must be >= 1.0".to_string());
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err("api.retry.initial_delay_ms cannot exceed max_delay_ms".to_string());
        }
        Ok(())
    }

    /// Delay before retry number `attempt` (1-based), capped at `max_delay_ms`
    pub fn delay_for(&self, attempt: usize) -> u64 {
        let exponent = attempt.saturating_sub(1) as i32;
        let delay = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        (delay as u64).min(self.max_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Clinic REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://clinic.example.com`; `/api/...` paths are joined onto it
    pub base_url: String,

    /// Bearer token sent on every request
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub auth_token: Option<SecretString>,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default)]
    pub retry: RetryConfig,

    /// Post audit entries to `/api/ledger` after cancel and reschedule
    #[serde(default = "default_true")]
    pub ledger_enabled: bool,
}

impl ApiConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.base_url.trim().is_empty() {
            return Err("api.base_url cannot be empty".to_string());
        }

        let url = Url::parse(&self.base_url)
            .map_err(|e| format!("api.base_url '{}' is not a valid URL: {}", self.base_url, e))?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(format!(
                    "api.base_url must use http or https, got '{other}'"
                ))
            }
        }

        if *environment == Environment::Production && url.scheme() != "https" {
            return Err(
                "api.base_url must use https in production environments. \
                For local testing, set 'environment = \"development\"'."
                    .to_string(),
            );
        }

        if let Some(token) = &self.auth_token {
            if token.expose_secret().is_blank() {
                return Err("api.auth_token cannot be blank when provided".to_string());
            }
        }

        if self.timeout_seconds == 0 {
            return Err("api.timeout_seconds must be > 0".to_string());
        }

        self.retry.validate()?;
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            auth_token: None,
            timeout_seconds: default_timeout_seconds(),
            retry: RetryConfig::default(),
            ledger_enabled: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Directory for JSON log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_local_path() -> String {
    "/var/log/slotwise".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
