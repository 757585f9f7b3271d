//! Init command implementation
//!
//! Writes a starter `slotwise.toml`.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "slotwise.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set api.base_url in {}", self.output);
                println!("  2. Put SLOTWISE_API_TOKEN in your environment or a .env file");
                println!("  3. Validate configuration: slotwise validate-config");
                println!("  4. Show free slots: slotwise slots --date 2024-06-10");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    fn generate_minimal_config() -> String {
        r#"# Slotwise Configuration File

environment = "development"

[application]
log_level = "info"
dry_run = false

[api]
base_url = "http://localhost:5000"
auth_token = "${SLOTWISE_API_TOKEN}"

[schedule]
default_duration_minutes = 30

[[schedule.breaks]]
name = "Lunch"
start = "12:00"
end = "13:00"

[logging]
local_enabled = false
"#
        .to_string()
    }

    fn generate_config_with_examples() -> String {
        r#"# Slotwise Configuration File
#
# Values of the form ${NAME} are replaced with environment variables when
# the file is loaded. Any SLOTWISE_<SECTION>_<KEY> variable overrides the
# matching value, e.g. SLOTWISE_API_BASE_URL.

# development | staging | production (production requires https)
environment = "development"

[application]
# trace, debug, info, warn, error
log_level = "info"

# Walk the wizard without creating or updating appointments
dry_run = false

[api]
# Clinic backend; /api/... paths are appended
base_url = "http://localhost:5000"

# Bearer token (keep it out of the file)
auth_token = "${SLOTWISE_API_TOKEN}"

timeout_seconds = 30

# Post audit entries after cancel and reschedule
ledger_enabled = true

[api.retry]
# Reads only; creates and updates are never retried
max_retries = 3
initial_delay_ms = 500
max_delay_ms = 10000
backoff_multiplier = 2.0

[schedule]
# 15, 20, 30, 45 or 60
default_duration_minutes = 30

# start-only: an appointment may run into a break but not start in one
# full-interval: the whole appointment must avoid every break
break_overlap_policy = "start-only"

[schedule.operating_hours]
start = "08:00"
end = "18:00"

[[schedule.breaks]]
name = "Lunch"
start = "12:00"
end = "13:00"

# [[schedule.breaks]]
# name = "Staff meeting"
# start = "16:00"
# end = "16:30"

[schedule.slot_grid]
# Anchors run from start up to (not including) end
start = "07:00"
end = "19:00"
interval_minutes = 30
# Use operating_hours instead of start/end
follow_operating_hours = false

[logging]
local_enabled = true
local_path = "/var/log/slotwise"
# daily, hourly, never
local_rotation = "daily"
"#
        .to_string()
    }
}
