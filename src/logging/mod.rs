//! Logging and observability
//!
//! Structured logging via `tracing`:
//! - human-readable console output
//! - optional JSON file output with rotation
//! - level from config, `--log-level`, or `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use slotwise::logging::init_logging;
//! use slotwise::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a submission
///
/// # Example
///
/// ```no_run
/// use slotwise::log_submission_start;
///
/// let session_id = uuid::Uuid::new_v4();
/// log_submission_start!(session_id, 3, "create");
/// ```
#[macro_export]
macro_rules! log_submission_start {
    ($session_id:expr, $count:expr, $mode:expr) => {
        tracing::info!(
            session_id = %$session_id,
            count = $count,
            mode = $mode,
            "Submitting appointments"
        );
    };
}

/// Log the outcome of a submission
///
/// # Example
///
/// ```no_run
/// use slotwise::log_submission_complete;
/// use std::time::Duration;
///
/// let session_id = uuid::Uuid::new_v4();
/// log_submission_complete!(session_id, 2, 1, Duration::from_millis(350));
/// ```
#[macro_export]
macro_rules! log_submission_complete {
    ($session_id:expr, $created:expr, $failed:expr, $duration:expr) => {
        if $failed == 0 {
            tracing::info!(
                session_id = %$session_id,
                created = $created,
                failed = $failed,
                duration_ms = $duration.as_millis() as u64,
                "Submission completed"
            );
        } else {
            tracing::warn!(
                session_id = %$session_id,
                created = $created,
                failed = $failed,
                duration_ms = $duration.as_millis() as u64,
                "Submission completed with failures"
            );
        }
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use slotwise::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying request"
        );
    };
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    #[test]
    fn test_macros_expand() {
        let session_id = uuid::Uuid::new_v4();
        crate::log_submission_start!(session_id, 2usize, "create");
        crate::log_submission_complete!(session_id, 1usize, 1usize, Duration::from_millis(5));
        crate::log_retry_attempt!(1, 3, "timeout");
    }
}
