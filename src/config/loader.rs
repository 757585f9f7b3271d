//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{Environment, SlotwiseConfig};
use super::secret::secret_string;
use crate::core::schedule::BreakOverlapPolicy;
use crate::domain::errors::SlotwiseError;
use crate::domain::result::Result;
use crate::domain::AppointmentDuration;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SlotwiseConfig
/// 4. Applies environment variable overrides (SLOTWISE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`SlotwiseError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, parsing fails, or validation
/// fails.
///
/// # Examples
///
/// ```no_run
/// use slotwise::config::loader::load_config;
///
/// let config = load_config("slotwise.toml").expect("Failed to load config");
/// println!("{}", config.api.base_url);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SlotwiseConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SlotwiseError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SlotwiseError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: SlotwiseConfig = toml::from_str(&contents)
        .map_err(|e| SlotwiseError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        SlotwiseError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left alone.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SlotwiseError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(SlotwiseError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides using the SLOTWISE_* prefix
///
/// Variables follow `SLOTWISE_<SECTION>_<KEY>`, for example
/// `SLOTWISE_API_BASE_URL` or `SLOTWISE_SCHEDULE_DEFAULT_DURATION_MINUTES`.
/// Unparseable numeric values are rejected rather than ignored.
fn apply_env_overrides(config: &mut SlotwiseConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("SLOTWISE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("SLOTWISE_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("SLOTWISE_ENVIRONMENT") {
        config.environment = match val.to_lowercase().as_str() {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => {
                return Err(SlotwiseError::Configuration(format!(
                    "Invalid SLOTWISE_ENVIRONMENT '{other}'"
                )))
            }
        };
    }

    // API overrides
    if let Ok(val) = std::env::var("SLOTWISE_API_BASE_URL") {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("SLOTWISE_API_AUTH_TOKEN") {
        config.api.auth_token = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("SLOTWISE_API_TIMEOUT_SECONDS") {
        config.api.timeout_seconds = parse_override("SLOTWISE_API_TIMEOUT_SECONDS", &val)?;
    }
    if let Ok(val) = std::env::var("SLOTWISE_API_LEDGER_ENABLED") {
        config.api.ledger_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("SLOTWISE_API_RETRY_MAX_RETRIES") {
        config.api.retry.max_retries = parse_override("SLOTWISE_API_RETRY_MAX_RETRIES", &val)?;
    }

    // Schedule overrides
    if let Ok(val) = std::env::var("SLOTWISE_SCHEDULE_DEFAULT_DURATION_MINUTES") {
        let minutes: u32 = parse_override("SLOTWISE_SCHEDULE_DEFAULT_DURATION_MINUTES", &val)?;
        config.schedule.default_duration = AppointmentDuration::try_from(minutes)?;
    }
    if let Ok(val) = std::env::var("SLOTWISE_SCHEDULE_BREAK_OVERLAP_POLICY") {
        config.schedule.break_overlap_policy = match val.as_str() {
            "start-only" => BreakOverlapPolicy::StartOnly,
            "full-interval" => BreakOverlapPolicy::FullInterval,
            other => {
                return Err(SlotwiseError::Configuration(format!(
                    "Invalid SLOTWISE_SCHEDULE_BREAK_OVERLAP_POLICY '{other}'. \
                    Must be one of: start-only, full-interval"
                )))
            }
        };
    }

    // Logging overrides
    if let Ok(val) = std::env::var("SLOTWISE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("SLOTWISE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        SlotwiseError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("SLOTWISE_LOADER_TEST_TOKEN", "abc123");
        let input = "auth_token = \"${SLOTWISE_LOADER_TEST_TOKEN}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "auth_token = \"abc123\"");
        std::env::remove_var("SLOTWISE_LOADER_TEST_TOKEN");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("SLOTWISE_LOADER_MISSING");
        let input = "auth_token = \"${SLOTWISE_LOADER_MISSING}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("SLOTWISE_LOADER_MISSING"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# auth_token = \"${SLOTWISE_LOADER_COMMENTED}\"";
        assert_eq!(substitute_env_vars(input).unwrap(), input);
    }

    #[test]
    fn test_parse_override() {
        assert_eq!(parse_override::<u64>("X", " 15 ").unwrap(), 15);
        assert!(parse_override::<u64>("X", "soon").is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-slotwise.toml");
        assert!(matches!(result, Err(SlotwiseError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[api]
base_url = "https://clinic.example.com"

[schedule]
default_duration_minutes = 20

[[schedule.breaks]]
name = "Lunch"
start = "12:30"
end = "13:15"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.api.base_url, "https://clinic.example.com");
        assert_eq!(
            config.schedule.default_duration,
            AppointmentDuration::Minutes20
        );
        assert_eq!(config.schedule.breaks[0].start.to_string(), "12:30");
    }
}
