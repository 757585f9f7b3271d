//! Validate config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        match config.validate() {
            Ok(_) => {
                let schedule = &config.schedule;
                println!("Configuration is valid");
                println!();
                println!("Configuration Summary:");
                println!("  Environment: {:?}", config.environment);
                println!("  Log Level: {}", config.application.log_level);
                println!("  Dry Run: {}", config.application.dry_run);
                println!("  Clinic API: {}", config.api.base_url);
                println!(
                    "  Auth Token: {}",
                    if config.api.auth_token.is_some() { "set" } else { "not set" }
                );
                println!(
                    "  Operating Hours: {} - {}",
                    schedule.operating_hours.start, schedule.operating_hours.end
                );
                for period in &schedule.breaks {
                    println!("  Break: {} {} - {}", period.name, period.start, period.end);
                }
                println!("  Break Policy: {:?}", schedule.break_overlap_policy);
                println!("  Default Duration: {}", schedule.default_duration);
                println!("  Slot Anchors: {}", schedule.slot_anchors().len());
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2)
            }
        }
    }
}
