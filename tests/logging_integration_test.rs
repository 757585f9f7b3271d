//! Integration tests for logging functionality

use slotwise::config::LoggingConfig;
use slotwise::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
    assert!(!config.local_path.is_empty());
}

#[test]
fn test_invalid_level_is_rejected_before_init() {
    let config = LoggingConfig {
        local_enabled: false,
        ..LoggingConfig::default()
    };
    assert!(init_logging("verbose", &config).is_err());
}

#[test]
fn test_invalid_rotation_is_rejected_before_init() {
    let temp_dir = TempDir::new().unwrap();
    let config = LoggingConfig {
        local_enabled: true,
        local_path: temp_dir.path().to_string_lossy().to_string(),
        local_rotation: "weekly".to_string(),
    };
    assert!(init_logging("info", &config).is_err());
}

// The only test in this binary that installs the global subscriber
#[test]
fn test_file_logging_creates_directory_and_writes() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };
    assert!(!log_path.exists());

    let guard = init_logging("info", &config).unwrap();
    tracing::info!(target: "slotwise", session = "test", "Booking session started");
    drop(guard);

    assert!(log_path.exists());
    let written = std::fs::read_to_string(log_path.join("slotwise.log")).unwrap();
    assert!(written.contains("Booking session started"));
}
