//! Integration tests for configuration loading and validation
//!
//! Tests that touch environment variables hold `ENV_MUTEX`.

use slotwise::config::{load_config, Environment};
use slotwise::core::schedule::BreakOverlapPolicy;
use slotwise::domain::{AppointmentDuration, ClockTime};
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    for var in [
        "SLOTWISE_APPLICATION_LOG_LEVEL",
        "SLOTWISE_APPLICATION_DRY_RUN",
        "SLOTWISE_ENVIRONMENT",
        "SLOTWISE_API_BASE_URL",
        "SLOTWISE_API_AUTH_TOKEN",
        "SLOTWISE_API_TIMEOUT_SECONDS",
        "SLOTWISE_API_LEDGER_ENABLED",
        "SLOTWISE_API_RETRY_MAX_RETRIES",
        "SLOTWISE_SCHEDULE_DEFAULT_DURATION_MINUTES",
        "SLOTWISE_SCHEDULE_BREAK_OVERLAP_POLICY",
        "SLOTWISE_LOGGING_LOCAL_ENABLED",
        "SLOTWISE_LOGGING_LOCAL_PATH",
        "TEST_SLOTWISE_TOKEN",
    ] {
        std::env::remove_var(var);
    }
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

fn hm(h: u32, m: u32) -> ClockTime {
    ClockTime::from_hm(h, m).unwrap()
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
environment = "staging"

[application]
log_level = "debug"
dry_run = true

[api]
base_url = "https://clinic.example.com"
auth_token = "token-123"
timeout_seconds = 10
ledger_enabled = false

[api.retry]
max_retries = 5
initial_delay_ms = 100
max_delay_ms = 2000
backoff_multiplier = 1.5

[schedule]
default_duration_minutes = 45
break_overlap_policy = "full-interval"

[schedule.operating_hours]
start = "09:00"
end = "17:00"

[[schedule.breaks]]
name = "Lunch"
start = "12:30"
end = "13:30"

[[schedule.breaks]]
name = "Staff meeting"
start = "16:00"
end = "16:30"

[schedule.slot_grid]
interval_minutes = 15
follow_operating_hours = true

[logging]
local_enabled = false
local_path = "/tmp/slotwise"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).expect("Failed to load config");

    assert_eq!(config.environment, Environment::Staging);
    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);

    assert_eq!(config.api.base_url, "https://clinic.example.com");
    let token: &str = config.api.auth_token.as_ref().unwrap().expose_secret().as_ref();
    assert_eq!(token, "token-123");
    assert_eq!(config.api.timeout_seconds, 10);
    assert!(!config.api.ledger_enabled);
    assert_eq!(config.api.retry.max_retries, 5);

    let schedule = &config.schedule;
    assert_eq!(schedule.default_duration, AppointmentDuration::Minutes45);
    assert_eq!(schedule.break_overlap_policy, BreakOverlapPolicy::FullInterval);
    assert_eq!(schedule.operating_hours.start, hm(9, 0));
    assert_eq!(schedule.breaks.len(), 2);
    assert_eq!(schedule.breaks[1].name, "Staff meeting");

    let anchors = schedule.slot_anchors();
    assert_eq!(anchors.first(), Some(&hm(9, 0)));
    assert_eq!(anchors.last(), Some(&hm(16, 45)));
    assert_eq!(anchors.len(), 32);

    assert!(!config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[api]
base_url = "http://localhost:5000"
"#,
    );

    let config = load_config(file.path()).expect("Failed to load config");

    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    assert!(config.api.auth_token.is_none());
    assert_eq!(config.api.timeout_seconds, 30);
    assert!(config.api.ledger_enabled);

    let schedule = &config.schedule;
    assert_eq!(schedule.default_duration, AppointmentDuration::Minutes30);
    assert_eq!(schedule.break_overlap_policy, BreakOverlapPolicy::StartOnly);
    assert_eq!(schedule.breaks.len(), 1);
    assert_eq!(schedule.breaks[0].name, "Lunch");
    assert_eq!(schedule.breaks[0].start, hm(12, 0));

    let anchors = schedule.slot_anchors();
    assert_eq!(anchors.first(), Some(&hm(7, 0)));
    assert_eq!(anchors.last(), Some(&hm(18, 30)));
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_SLOTWISE_TOKEN", "substituted-token");

    let file = write_config(
        r#"
[api]
base_url = "http://localhost:5000"
auth_token = "${TEST_SLOTWISE_TOKEN}"
"#,
    );

    let config = load_config(file.path()).expect("Failed to load config");
    let token: &str = config.api.auth_token.as_ref().unwrap().expose_secret().as_ref();
    assert_eq!(token, "substituted-token");

    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[api]
base_url = "http://localhost:5000"
auth_token = "${TEST_SLOTWISE_TOKEN}"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_SLOTWISE_TOKEN"));
}

#[test]
fn test_env_var_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("SLOTWISE_APPLICATION_LOG_LEVEL", "trace");
    std::env::set_var("SLOTWISE_API_BASE_URL", "http://override.local:8080");
    std::env::set_var("SLOTWISE_SCHEDULE_DEFAULT_DURATION_MINUTES", "15");
    std::env::set_var("SLOTWISE_SCHEDULE_BREAK_OVERLAP_POLICY", "full-interval");

    let file = write_config(
        r#"
[application]
log_level = "info"

[api]
base_url = "http://localhost:5000"

[schedule]
default_duration_minutes = 30
"#,
    );

    let result = load_config(file.path());
    cleanup_env_vars();
    let config = result.expect("Failed to load config");

    assert_eq!(config.application.log_level, "trace");
    assert_eq!(config.api.base_url, "http://override.local:8080");
    assert_eq!(config.schedule.default_duration, AppointmentDuration::Minutes15);
    assert_eq!(
        config.schedule.break_overlap_policy,
        BreakOverlapPolicy::FullInterval
    );
}

#[test]
fn test_invalid_duration_override_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("SLOTWISE_SCHEDULE_DEFAULT_DURATION_MINUTES", "25");

    let file = write_config(
        r#"
[api]
base_url = "http://localhost:5000"
"#,
    );

    let result = load_config(file.path());
    cleanup_env_vars();
    assert!(result.is_err());
}

#[test]
fn test_invalid_config_validation() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let cases = [
        r#"
[application]
log_level = "invalid_level"

[api]
base_url = "http://localhost:5000"
"#,
        r#"
environment = "production"

[api]
base_url = "http://clinic.example.com"
"#,
        r#"
[api]
base_url = "http://localhost:5000"

[schedule]
default_duration_minutes = 25
"#,
        r#"
[api]
base_url = "http://localhost:5000"

[[schedule.breaks]]
name = "Backwards"
start = "13:00"
end = "12:00"
"#,
        r#"
[api]
base_url = "http://localhost:5000"

[schedule.slot_grid]
interval_minutes = 0
"#,
    ];

    for content in cases {
        let file = write_config(content);
        assert!(
            load_config(file.path()).is_err(),
            "expected rejection for:\n{content}"
        );
    }
}

#[test]
fn test_missing_file() {
    let err = load_config("/nonexistent/slotwise.toml").unwrap_err();
    assert!(err.to_string().contains("not found"));
}
