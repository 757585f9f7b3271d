//! In-memory clinic backend
//!
//! Stores appointments and patients in process and records every write, so
//! workflow tests can assert exactly which calls were made. Failures can be
//! injected per patient for creates and globally for the ledger.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use super::models::{AppointmentUpdateRequest, LedgerEntry, NewAppointmentRequest};
use super::traits::AppointmentApi;
use crate::domain::{
    parse_date, ApiError, AppointmentId, AppointmentStatus, ClockTime, ExistingAppointment,
    PatientId, PatientSummary,
};

#[derive(Default)]
struct MemoryState {
    appointments: Vec<ExistingAppointment>,
    patients: Vec<PatientSummary>,
    created: Vec<NewAppointmentRequest>,
    create_attempts: usize,
    updates: Vec<(AppointmentId, AppointmentUpdateRequest)>,
    status_changes: Vec<(AppointmentId, AppointmentStatus)>,
    ledger: Vec<LedgerEntry>,
    list_calls: Vec<NaiveDate>,
    failing_patients: HashSet<PatientId>,
    fail_ledger: bool,
    next_id: u64,
}

/// Clinic API backed by process memory
#[derive(Default)]
pub struct InMemoryClinicApi {
    state: Mutex<MemoryState>,
}

impl InMemoryClinicApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_appointments(self, appointments: Vec<ExistingAppointment>) -> Self {
        self.state().appointments.extend(appointments);
        self
    }

    pub fn with_patients(self, patients: Vec<PatientSummary>) -> Self {
        self.state().patients.extend(patients);
        self
    }

    /// Every create for this patient answers with a server error
    pub fn fail_creates_for(&self, patient_id: PatientId) {
        self.state().failing_patients.insert(patient_id);
    }

    /// Every ledger write answers with a server error
    pub fn fail_ledger(&self) {
        self.state().fail_ledger = true;
    }

    pub fn clear_failures(&self) {
        let mut state = self.state();
        state.failing_patients.clear();
        state.fail_ledger = false;
    }

    /// Successful create bodies, in call order
    pub fn created(&self) -> Vec<NewAppointmentRequest> {
        self.state().created.clone()
    }

    /// Create calls including failed ones
    pub fn create_attempts(&self) -> usize {
        self.state().create_attempts
    }

    pub fn updates(&self) -> Vec<(AppointmentId, AppointmentUpdateRequest)> {
        self.state().updates.clone()
    }

    pub fn status_changes(&self) -> Vec<(AppointmentId, AppointmentStatus)> {
        self.state().status_changes.clone()
    }

    pub fn ledger_entries(&self) -> Vec<LedgerEntry> {
        self.state().ledger.clone()
    }

    /// Dates requested through `appointments_on`, in call order
    pub fn list_calls(&self) -> Vec<NaiveDate> {
        self.state().list_calls.clone()
    }

    pub fn stored(&self, id: &AppointmentId) -> Option<ExistingAppointment> {
        self.state().appointments.iter().find(|a| &a.id == id).cloned()
    }
}

fn not_found(id: &AppointmentId) -> ApiError {
    ApiError::NotFound(format!("appointment {id}"))
}

fn bad_request(message: String) -> ApiError {
    ApiError::ClientError {
        status: 400,
        message,
    }
}

#[async_trait]
impl AppointmentApi for InMemoryClinicApi {
    async fn appointments_on(&self, date: NaiveDate) -> Result<Vec<ExistingAppointment>, ApiError> {
        let mut state = self.state();
        state.list_calls.push(date);
        Ok(state
            .appointments
            .iter()
            .filter(|a| a.date == date)
            .cloned()
            .collect())
    }

    async fn appointment(&self, id: &AppointmentId) -> Result<ExistingAppointment, ApiError> {
        self.stored(id).ok_or_else(|| not_found(id))
    }

    async fn create_appointment(
        &self,
        request: &NewAppointmentRequest,
    ) -> Result<AppointmentId, ApiError> {
        let mut state = self.state();
        state.create_attempts += 1;

        if state.failing_patients.contains(&request.patient_id) {
            return Err(ApiError::ServerError {
                status: 500,
                message: format!("could not book patient {}", request.patient_id),
            });
        }

        let date = parse_date(&request.appointment_date).map_err(|e| bad_request(e.to_string()))?;
        let time: ClockTime = request
            .appointment_time
            .parse()
            .map_err(|e: crate::domain::SchedulingError| bad_request(e.to_string()))?;

        state.next_id += 1;
        let id = AppointmentId::new(format!("mem-{}", state.next_id)).map_err(bad_request)?;
        let display_name = state
            .patients
            .iter()
            .find(|p| p.id == request.patient_id)
            .map(|p| p.display_name.clone())
            .unwrap_or_default();

        state.appointments.push(ExistingAppointment {
            id: id.clone(),
            patient_id: Some(request.patient_id.clone()),
            patient_display_name: display_name,
            date,
            time,
            duration_minutes: request.duration,
            visit_type: Some(request.visit_type),
            status: AppointmentStatus::Scheduled,
        });
        state.created.push(request.clone());
        Ok(id)
    }

    async fn update_appointment(
        &self,
        id: &AppointmentId,
        request: &AppointmentUpdateRequest,
    ) -> Result<(), ApiError> {
        let date = parse_date(&request.appointment_date).map_err(|e| bad_request(e.to_string()))?;
        let time: ClockTime = request
            .appointment_time
            .parse()
            .map_err(|e: crate::domain::SchedulingError| bad_request(e.to_string()))?;

        let mut state = self.state();
        let stored = state
            .appointments
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| not_found(id))?;
        stored.date = date;
        stored.time = time;
        stored.duration_minutes = request.duration;
        stored.visit_type = Some(request.visit_type);
        stored.status = request.status;
        state.updates.push((id.clone(), request.clone()));
        Ok(())
    }

    async fn update_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> Result<(), ApiError> {
        let mut state = self.state();
        let stored = state
            .appointments
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| not_found(id))?;
        stored.status = status;
        state.status_changes.push((id.clone(), status));
        Ok(())
    }

    async fn search_patients(&self, query: &str) -> Result<Vec<PatientSummary>, ApiError> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .state()
            .patients
            .iter()
            .filter(|p| {
                p.display_name.to_lowercase().contains(&needle)
                    || p.record_number
                        .as_deref()
                        .is_some_and(|r| r.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    async fn record_ledger_entry(&self, entry: &LedgerEntry) -> Result<(), ApiError> {
        let mut state = self.state();
        if state.fail_ledger {
            return Err(ApiError::ServerError {
                status: 503,
                message: "ledger unavailable".to_string(),
            });
        }
        state.ledger.push(entry.clone());
        Ok(())
    }
}
