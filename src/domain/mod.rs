//! Domain models and types for Slotwise.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`AppointmentId`], [`PatientId`], [`DraftId`])
//! - **Clock primitives** ([`ClockTime`], [`AppointmentDuration`])
//! - **Appointment vocabulary** ([`VisitType`], [`ColorTag`], [`AppointmentStatus`])
//! - **Drafts** ([`AppointmentDraft`], [`RescheduleContext`])
//! - **Error types** ([`SlotwiseError`], [`ApiError`], [`SchedulingError`])
//! - **Result type alias** ([`Result`])
//!
//! # Example
//!
//! ```rust
//! use slotwise::domain::{ClockTime, VisitType, ColorTag};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let start: ClockTime = "11:45".parse()?;
//! assert_eq!(start.end_minutes(30), 12 * 60 + 15);
//! assert_eq!(VisitType::NewPatient.default_color(), ColorTag::Yellow);
//! # Ok(())
//! # }
//! ```

pub mod appointment;
pub mod draft;
pub mod errors;
pub mod ids;
pub mod result;
pub mod time;

// Re-export commonly used types for convenience
pub use appointment::{AppointmentStatus, ColorTag, ExistingAppointment, PatientSummary, VisitType};
pub use draft::{AppointmentDraft, RescheduleContext, SlotKey};
pub use errors::{ApiError, SchedulingError, SlotwiseError};
pub use ids::{AppointmentId, DraftId, PatientId};
pub use result::Result;
pub use time::{date_key, parse_date, AppointmentDuration, ClockTime};
