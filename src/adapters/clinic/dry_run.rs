//! Read-through, write-suppressing wrapper used when `application.dry_run` is set
//!
//! Reads go to the wrapped API so the conflict view reflects the real
//! schedule. Writes are logged and acknowledged without leaving the process.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use super::models::{AppointmentUpdateRequest, LedgerEntry, NewAppointmentRequest};
use super::traits::AppointmentApi;
use crate::domain::{ApiError, AppointmentId, AppointmentStatus, ExistingAppointment, PatientSummary};

pub struct DryRunClinicApi {
    inner: Arc<dyn AppointmentApi>,
    suppressed: AtomicUsize,
}

impl DryRunClinicApi {
    pub fn new(inner: Arc<dyn AppointmentApi>) -> Self {
        Self {
            inner,
            suppressed: AtomicUsize::new(0),
        }
    }

    /// Number of writes that were not sent
    pub fn suppressed_writes(&self) -> usize {
        self.suppressed.load(Ordering::Relaxed)
    }

    fn suppress(&self) {
        self.suppressed.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl AppointmentApi for DryRunClinicApi {
    async fn appointments_on(&self, date: NaiveDate) -> Result<Vec<ExistingAppointment>, ApiError> {
        self.inner.appointments_on(date).await
    }

    async fn appointment(&self, id: &AppointmentId) -> Result<ExistingAppointment, ApiError> {
        self.inner.appointment(id).await
    }

    async fn create_appointment(
        &self,
        request: &NewAppointmentRequest,
    ) -> Result<AppointmentId, ApiError> {
        self.suppress();
        tracing::info!(
            patient_id = %request.patient_id,
            date = %request.appointment_date,
            time = %request.appointment_time,
            duration = request.duration,
            visit_type = %request.visit_type,
            "Dry run: appointment not created"
        );
        AppointmentId::new(format!("dry-run-{}", Uuid::new_v4())).map_err(ApiError::InvalidResponse)
    }

    async fn update_appointment(
        &self,
        id: &AppointmentId,
        request: &AppointmentUpdateRequest,
    ) -> Result<(), ApiError> {
        self.suppress();
        tracing::info!(
            appointment_id = %id,
            date = %request.appointment_date,
            time = %request.appointment_time,
            action = %request.action_taken,
            "Dry run: appointment not updated"
        );
        Ok(())
    }

    async fn update_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> Result<(), ApiError> {
        self.suppress();
        tracing::info!(appointment_id = %id, status = %status, "Dry run: status not changed");
        Ok(())
    }

    async fn search_patients(&self, query: &str) -> Result<Vec<PatientSummary>, ApiError> {
        self.inner.search_patients(query).await
    }

    async fn record_ledger_entry(&self, entry: &LedgerEntry) -> Result<(), ApiError> {
        self.suppress();
        tracing::info!(
            appointment_id = %entry.appointment_id,
            action = %entry.action,
            "Dry run: ledger entry not recorded"
        );
        Ok(())
    }
}
