//! Domain error types
//!
//! This module defines the error hierarchy for Slotwise. Local validation
//! failures ([`SchedulingError`]) are kept apart from failures of the remote
//! clinic API ([`ApiError`]) so callers can tell "never left the process"
//! from "the server said no". No third-party types are exposed.

use thiserror::Error;

/// Main Slotwise error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum SlotwiseError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Clinic API errors
    #[error("Clinic API error: {0}")]
    Api(#[from] ApiError),

    /// Scheduling rule violations detected locally
    #[error("Scheduling error: {0}")]
    Scheduling(#[from] SchedulingError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network/connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Clinic REST API errors
///
/// Errors that occur when talking to the appointment/patient backend.
/// These errors don't expose the HTTP client's types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failed to reach the server
    #[error("Failed to connect to clinic API: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Response body could not be understood
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Appointment or patient not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server answered with `success: false`
    #[error("Request rejected by server: {0}")]
    Rejected(String),

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },
}

impl ApiError {
    /// Whether a retry of the same request could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::ConnectionFailed(_) | ApiError::Timeout(_) | ApiError::ServerError { .. }
        )
    }
}

/// Local scheduling errors
///
/// Raised synchronously by the draft set and the wizard. They are surfaced
/// inline and never sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulingError {
    /// Placement starts inside (or, under full-interval policy, runs into) a break
    #[error("{time} falls within the '{break_name}' break")]
    DuringBreak { time: String, break_name: String },

    /// Manual time entry is not 24-hour HH:MM
    #[error("Invalid time '{0}'. Expected 24-hour HH:MM")]
    InvalidTime(String),

    /// Calendar date is not YYYY-MM-DD
    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Duration outside the enumerated set
    #[error("Invalid duration {0} minutes. Must be one of: 15, 20, 30, 45, 60")]
    InvalidDuration(u32),

    /// Unknown visit type label
    #[error("Unknown visit type '{0}'")]
    UnknownVisitType(String),

    /// Unknown color tag label
    #[error("Unknown color tag '{0}'")]
    UnknownColorTag(String),

    /// Draft id not present in the set
    #[error("Draft not found: {0}")]
    DraftNotFound(String),

    /// Slot placed on a date outside the current selection
    #[error("Date {0} is not part of the current selection")]
    DateNotSelected(String),

    /// One or more drafts miss a patient or visit type
    #[error("{} draft(s) are missing a patient or visit type", .0.len())]
    IncompleteDrafts(Vec<String>),

    /// Wizard step guard refused the navigation
    #[error("Cannot move to {target}: {reason}")]
    StepNotReachable { target: String, reason: String },

    /// Reschedule mode holds exactly one draft
    #[error("Reschedule mode holds exactly one appointment: {0}")]
    RescheduleSingleDraft(String),

    /// Submission attempted outside the Confirming step
    #[error("Submission is only possible from the confirmation step (current: {0})")]
    NotConfirming(String),

    /// Wizard already submitted everything
    #[error("This scheduling session has already been submitted")]
    AlreadySubmitted,

    /// Appointment status change not permitted
    #[error("Cannot change appointment status from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },
}

// Conversion from std::io::Error
impl From<std::io::Error> for SlotwiseError {
    fn from(err: std::io::Error) -> Self {
        SlotwiseError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SlotwiseError {
    fn from(err: serde_json::Error) -> Self {
        SlotwiseError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SlotwiseError {
    fn from(err: toml::de::Error) -> Self {
        SlotwiseError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slotwise_error_display() {
        let err = SlotwiseError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_api_error_conversion() {
        let api_err = ApiError::ConnectionFailed("Network error".to_string());
        let err: SlotwiseError = api_err.into();
        assert!(matches!(err, SlotwiseError::Api(_)));
    }

    #[test]
    fn test_scheduling_error_conversion() {
        let sched_err = SchedulingError::InvalidTime("25:00".to_string());
        let err: SlotwiseError = sched_err.into();
        assert!(matches!(err, SlotwiseError::Scheduling(_)));
        assert!(err.to_string().contains("25:00"));
    }

    #[test]
    fn test_during_break_message() {
        let err = SchedulingError::DuringBreak {
            time: "12:30".to_string(),
            break_name: "Lunch".to_string(),
        };
        assert_eq!(err.to_string(), "12:30 falls within the 'Lunch' break");
    }

    #[test]
    fn test_incomplete_drafts_message_counts() {
        let err = SchedulingError::IncompleteDrafts(vec!["a".into(), "b".into()]);
        assert!(err.to_string().starts_with("2 draft(s)"));
    }

    #[test]
    fn test_api_error_retryable() {
        assert!(ApiError::Timeout("t".into()).is_retryable());
        assert!(ApiError::ServerError {
            status: 503,
            message: "down".into()
        }
        .is_retryable());
        assert!(!ApiError::ClientError {
            status: 400,
            message: "bad".into()
        }
        .is_retryable());
        assert!(!ApiError::Rejected("nope".into()).is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: SlotwiseError = io_err.into();
        assert!(matches!(err, SlotwiseError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: SlotwiseError = json_err.into();
        assert!(matches!(err, SlotwiseError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: SlotwiseError = toml_err.into();
        assert!(matches!(err, SlotwiseError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
