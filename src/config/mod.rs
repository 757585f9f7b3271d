//! Configuration management for Slotwise.
//!
//! TOML configuration with `${VAR_NAME}` substitution, `SLOTWISE_*`
//! environment overrides and validation on load.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use slotwise::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("slotwise.toml")?;
//!
//! println!("Clinic API: {}", config.api.base_url);
//! println!("Breaks: {}", config.schedule.breaks.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [application]
//! log_level = "info"
//!
//! [api]
//! base_url = "https://clinic.example.com"
//! auth_token = "${SLOTWISE_API_TOKEN}"
//!
//! [schedule]
//! default_duration_minutes = 30
//! break_overlap_policy = "start-only"
//!
//! [schedule.operating_hours]
//! start = "08:00"
//! end = "18:00"
//!
//! [[schedule.breaks]]
//! name = "Lunch"
//! start = "12:00"
//! end = "13:00"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{ApiConfig, ApplicationConfig, Environment, LoggingConfig, RetryConfig, SlotwiseConfig};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
