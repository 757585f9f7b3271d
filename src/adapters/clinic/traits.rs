//! Clinic API abstraction
//!
//! The scheduling workflow talks to the backend only through
//! [`AppointmentApi`], so it can be driven by [`HttpClinicApi`] in production
//! and by an in-memory implementation in tests.
//!
//! [`HttpClinicApi`]: super::client::HttpClinicApi

use async_trait::async_trait;
use chrono::NaiveDate;

use super::models::{AppointmentUpdateRequest, LedgerEntry, NewAppointmentRequest};
use crate::domain::{
    ApiError, AppointmentId, AppointmentStatus, ExistingAppointment, PatientSummary,
};

/// Operations the scheduler needs from the clinic backend
///
/// Implementations report transport and server failures as [`ApiError`];
/// local validation never reaches this layer.
#[async_trait]
pub trait AppointmentApi: Send + Sync {
    /// Appointments stored for one date, including cancelled ones
    async fn appointments_on(&self, date: NaiveDate) -> Result<Vec<ExistingAppointment>, ApiError>;

    /// Fetch one appointment
    async fn appointment(&self, id: &AppointmentId) -> Result<ExistingAppointment, ApiError>;

    /// Create one appointment, returning the id the server assigned
    async fn create_appointment(
        &self,
        request: &NewAppointmentRequest,
    ) -> Result<AppointmentId, ApiError>;

    /// Replace date, time and details of an existing appointment
    async fn update_appointment(
        &self,
        id: &AppointmentId,
        request: &AppointmentUpdateRequest,
    ) -> Result<(), ApiError>;

    async fn update_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> Result<(), ApiError>;

    async fn search_patients(&self, query: &str) -> Result<Vec<PatientSummary>, ApiError>;

    /// Append an audit record
    async fn record_ledger_entry(&self, entry: &LedgerEntry) -> Result<(), ApiError>;
}
