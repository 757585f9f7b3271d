//! CLI command implementations
//!
//! Every command returns the process exit code:
//! 0 success, 1 partial submission, 2 configuration, 3 validation,
//! 4 connection, 5 fatal.

pub mod book;
pub mod cancel;
pub mod init;
pub mod reschedule;
pub mod slots;
pub mod validate;

use std::sync::Arc;

use crate::adapters::clinic::{AppointmentApi, DryRunClinicApi, HttpClinicApi};
use crate::config::{load_config, SlotwiseConfig};
use crate::core::workflow::SubmissionReport;
use crate::domain::{ApiError, SlotwiseError};

pub const EXIT_OK: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_VALIDATION: i32 = 3;
pub const EXIT_CONNECTION: i32 = 4;
pub const EXIT_FATAL: i32 = 5;

/// Exit code for an error that stopped a command
pub fn exit_code_for(error: &SlotwiseError) -> i32 {
    match error {
        SlotwiseError::Configuration(_) => EXIT_CONFIG,
        SlotwiseError::Scheduling(_) | SlotwiseError::Validation(_) => EXIT_VALIDATION,
        SlotwiseError::Connection(_) => EXIT_CONNECTION,
        SlotwiseError::Api(api) => match api {
            ApiError::ConnectionFailed(_) | ApiError::Timeout(_) => EXIT_CONNECTION,
            ApiError::ClientError { .. } | ApiError::NotFound(_) | ApiError::Rejected(_) => {
                EXIT_VALIDATION
            }
            ApiError::InvalidResponse(_) | ApiError::ServerError { .. } => EXIT_FATAL,
        },
        _ => EXIT_FATAL,
    }
}

/// Exit code for a finished submission
pub fn exit_code_for_report(report: &SubmissionReport) -> i32 {
    if report.is_complete() {
        EXIT_OK
    } else {
        EXIT_PARTIAL
    }
}

/// Load and validate the configuration, printing the problem on failure
pub(crate) fn load_validated(
    config_path: &str,
) -> std::result::Result<SlotwiseConfig, i32> {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, config_path = %config_path, "Failed to load configuration");
            eprintln!("Failed to load configuration: {e}");
            return Err(EXIT_CONFIG);
        }
    };
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Configuration validation failed");
        eprintln!("Configuration validation failed: {e}");
        return Err(EXIT_CONFIG);
    }
    Ok(config)
}

/// HTTP client for the configured API, wrapped when writes must be suppressed
pub(crate) fn build_api(
    config: &SlotwiseConfig,
    dry_run: bool,
) -> crate::domain::Result<Arc<dyn AppointmentApi>> {
    let http: Arc<dyn AppointmentApi> = Arc::new(HttpClinicApi::new(&config.api)?);
    if dry_run || config.application.dry_run {
        tracing::info!("Dry run mode enabled - no appointments will be written");
        println!("DRY RUN MODE - nothing will be written to the clinic API");
        println!();
        Ok(Arc::new(DryRunClinicApi::new(http)))
    } else {
        Ok(http)
    }
}

/// Print a submission report the same way for `book` and `reschedule`
pub(crate) fn print_report(report: &SubmissionReport) {
    println!();
    println!("Submission Summary:");
    println!("  Accepted: {}", report.created.len());
    println!("  Failed: {}", report.failures.len());
    println!("  Duration: {:.2}s", report.duration.as_secs_f64());
    for created in &report.created {
        println!(
            "  + {} patient {} -> appointment {}",
            created.slot, created.patient_id, created.appointment_id
        );
    }
    for failure in &report.failures {
        println!(
            "  - #{} {} failed: {}",
            failure.index + 1,
            failure.slot,
            failure.error
        );
    }
    println!();
}
