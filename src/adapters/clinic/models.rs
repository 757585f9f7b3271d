//! Wire models for the clinic REST API
//!
//! Field names are camelCase on the wire. Dates travel as `YYYY-MM-DD`
//! (the backend may append a midnight timestamp) and times as `HH:MM`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    date_key, parse_date, AppointmentDraft, AppointmentId, AppointmentStatus, ApiError, ClockTime,
    ColorTag, ExistingAppointment, PatientId, PatientSummary, RescheduleContext, SchedulingError,
    VisitType,
};

/// Patient reference, either a bare id or a populated document
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PatientRef {
    Id(String),
    Populated(PatientDto),
}

impl PatientRef {
    fn id(&self) -> &str {
        match self {
            PatientRef::Id(id) => id,
            PatientRef::Populated(p) => &p.id,
        }
    }

    fn display_name(&self) -> Option<String> {
        match self {
            PatientRef::Id(_) => None,
            PatientRef::Populated(p) => Some(p.display_name()),
        }
    }
}

/// Patient document as returned by search and populated references
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDto {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub record_number: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl PatientDto {
    pub fn display_name(&self) -> String {
        if let Some(full) = self.full_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return full.trim().to_string();
        }
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            self.id.clone()
        } else {
            joined
        }
    }
}

impl TryFrom<PatientDto> for PatientSummary {
    type Error = ApiError;

    fn try_from(dto: PatientDto) -> Result<Self, Self::Error> {
        let display_name = dto.display_name();
        Ok(PatientSummary {
            id: PatientId::new(dto.id).map_err(ApiError::InvalidResponse)?,
            display_name,
            record_number: dto.record_number,
            phone: dto.phone,
        })
    }
}

/// Appointment document
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDto {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub patient_id: Option<PatientRef>,
    pub appointment_date: String,
    pub appointment_time: String,
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default)]
    pub visit_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

fn default_duration() -> u32 {
    30
}

impl TryFrom<AppointmentDto> for ExistingAppointment {
    type Error = ApiError;

    fn try_from(dto: AppointmentDto) -> Result<Self, Self::Error> {
        let date_part = dto.appointment_date.get(..10).unwrap_or(&dto.appointment_date);
        let date = parse_date(date_part).map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        let time: ClockTime = dto
            .appointment_time
            .parse()
            .map_err(|e: SchedulingError| ApiError::InvalidResponse(e.to_string()))?;

        let status = match dto.status.as_deref() {
            None => AppointmentStatus::Scheduled,
            Some(label) => parse_status(label).ok_or_else(|| {
                ApiError::InvalidResponse(format!("Unknown appointment status '{label}'"))
            })?,
        };

        let (patient_id, patient_display_name) = match &dto.patient_id {
            Some(patient) => (
                PatientId::new(patient.id()).ok(),
                patient.display_name().unwrap_or_default(),
            ),
            None => (None, String::new()),
        };

        Ok(ExistingAppointment {
            id: AppointmentId::new(dto.id).map_err(ApiError::InvalidResponse)?,
            patient_id,
            patient_display_name,
            date,
            time,
            duration_minutes: dto.duration,
            visit_type: dto.visit_type.as_deref().and_then(|v| v.parse::<VisitType>().ok()),
            status,
        })
    }
}

fn parse_status(label: &str) -> Option<AppointmentStatus> {
    [
        AppointmentStatus::Scheduled,
        AppointmentStatus::CheckedIn,
        AppointmentStatus::InProgress,
        AppointmentStatus::Completed,
        AppointmentStatus::CheckedOut,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Rescheduled,
    ]
    .into_iter()
    .find(|s| s.label().eq_ignore_ascii_case(label.trim()))
}

/// `GET /api/appointments/date/{date}` response
#[derive(Debug, Deserialize)]
pub struct AppointmentListResponse {
    pub success: bool,
    #[serde(default)]
    pub appointments: Vec<AppointmentDto>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Single-appointment response from create, update and fetch
#[derive(Debug, Deserialize)]
pub struct AppointmentEnvelope {
    pub success: bool,
    #[serde(default)]
    pub appointment: Option<AppointmentDto>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /api/patients?search=` response
#[derive(Debug, Deserialize)]
pub struct PatientSearchResponse {
    pub success: bool,
    #[serde(default)]
    pub patients: Vec<PatientDto>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Generic acknowledgement
#[derive(Debug, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /api/appointments` body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointmentRequest {
    pub patient_id: PatientId,
    pub appointment_date: String,
    pub appointment_time: String,
    pub duration: u32,
    pub visit_type: VisitType,
    pub color_tag: ColorTag,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chief_complaint: Option<String>,
}

impl NewAppointmentRequest {
    /// Body for a complete draft
    pub fn from_draft(draft: &AppointmentDraft) -> Result<Self, SchedulingError> {
        let (Some(patient_id), Some(visit_type)) = (&draft.patient_id, draft.visit_type) else {
            return Err(SchedulingError::IncompleteDrafts(vec![draft.id.to_string()]));
        };
        Ok(Self {
            patient_id: patient_id.clone(),
            appointment_date: date_key(draft.date),
            appointment_time: draft.time.to_string(),
            duration: draft.duration.minutes(),
            visit_type,
            color_tag: draft.color_tag,
            notes: draft.notes.clone(),
            chief_complaint: draft.chief_complaint.clone(),
        })
    }
}

/// `PUT /api/appointments/{id}` body used for rescheduling
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentUpdateRequest {
    pub appointment_date: String,
    pub appointment_time: String,
    pub duration: u32,
    pub visit_type: VisitType,
    pub color_tag: ColorTag,
    pub notes: String,
    pub status: AppointmentStatus,
    pub reschedule_reason: String,
    pub action_taken: String,
}

impl AppointmentUpdateRequest {
    /// Body moving the original appointment onto the draft's slot
    pub fn reschedule(
        draft: &AppointmentDraft,
        context: &RescheduleContext,
    ) -> Result<Self, SchedulingError> {
        let Some(visit_type) = draft.visit_type else {
            return Err(SchedulingError::IncompleteDrafts(vec![draft.id.to_string()]));
        };
        Ok(Self {
            appointment_date: date_key(draft.date),
            appointment_time: draft.time.to_string(),
            duration: draft.duration.minutes(),
            visit_type,
            color_tag: draft.color_tag,
            notes: draft.notes.clone(),
            status: AppointmentStatus::Scheduled,
            reschedule_reason: context.reason.clone(),
            action_taken: context.action_taken(draft.date, draft.time),
        })
    }
}

/// `PATCH /api/appointments/{id}/status` body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdateRequest {
    pub status: AppointmentStatus,
}

/// Audit record posted to `/api/ledger`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub entry_id: Uuid,
    pub appointment_id: AppointmentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<PatientId>,
    pub action: String,
    pub details: String,
    pub recorded_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(
        appointment_id: AppointmentId,
        patient_id: Option<PatientId>,
        action: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            appointment_id,
            patient_id,
            action: action.into(),
            details: details.into(),
            recorded_at: Utc::now(),
        }
    }
}
