//! Clinic REST API adapter
//!
//! Appointment listing, creation, rescheduling, status changes, patient
//! search and the audit ledger.

pub mod client;
pub mod dry_run;
pub mod memory;
pub mod models;
pub mod traits;

pub use client::HttpClinicApi;
pub use dry_run::DryRunClinicApi;
pub use memory::InMemoryClinicApi;
pub use models::{AppointmentUpdateRequest, LedgerEntry, NewAppointmentRequest};
pub use traits::AppointmentApi;
