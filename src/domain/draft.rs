//! Appointment drafts and reschedule context
//!
//! A draft is an appointment the user is composing that has not been sent to
//! the clinic backend yet.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::appointment::{ColorTag, VisitType};
use super::ids::{AppointmentId, DraftId, PatientId};
use super::time::{date_key, AppointmentDuration, ClockTime};

/// An appointment not yet persisted
///
/// Complete iff it has both a patient and a visit type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub id: DraftId,
    pub date: NaiveDate,
    pub time: ClockTime,
    pub duration: AppointmentDuration,
    pub patient_id: Option<PatientId>,
    pub patient_display_name: Option<String>,
    pub visit_type: Option<VisitType>,
    pub color_tag: ColorTag,
    pub notes: String,
    pub chief_complaint: Option<String>,
}

impl AppointmentDraft {
    /// New draft with the defaults used when a user drops a patient into a slot
    pub fn new(id: DraftId, date: NaiveDate, time: ClockTime, duration: AppointmentDuration) -> Self {
        let visit_type = VisitType::default();
        Self {
            id,
            date,
            time,
            duration,
            patient_id: None,
            patient_display_name: None,
            visit_type: Some(visit_type),
            color_tag: visit_type.default_color(),
            notes: String::new(),
            chief_complaint: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.patient_id.is_some() && self.visit_type.is_some()
    }

    /// Sets the visit type; the color tag always follows it
    pub fn set_visit_type(&mut self, visit_type: VisitType) {
        self.visit_type = Some(visit_type);
        self.color_tag = visit_type.default_color();
    }

    /// Bucket key `(YYYY-MM-DD, HH:MM)`
    pub fn slot_key(&self) -> SlotKey {
        SlotKey::new(self.date, self.time)
    }
}

/// Address of a scheduling bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub time: ClockTime,
}

impl SlotKey {
    pub fn new(date: NaiveDate, time: ClockTime) -> Self {
        Self { date, time }
    }

    pub fn date_key(&self) -> String {
        date_key(self.date)
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", date_key(self.date), self.time)
    }
}

/// Present only when the wizard edits one existing appointment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescheduleContext {
    pub appointment_id: AppointmentId,
    pub patient_id: PatientId,
    pub patient_display_name: String,
    pub original_date: NaiveDate,
    pub original_time: ClockTime,
    pub reason: String,
}

impl RescheduleContext {
    /// Note text seeded into the single reschedule draft
    pub fn seed_notes(&self) -> String {
        let mut notes = format!(
            "Rescheduled from {} at {}.",
            date_key(self.original_date),
            self.original_time
        );
        if !self.reason.trim().is_empty() {
            notes.push_str(&format!(" Reason: {}", self.reason.trim()));
        }
        notes
    }

    /// Audit annotation sent with the update call
    pub fn action_taken(&self, new_date: NaiveDate, new_time: ClockTime) -> String {
        format!(
            "Rescheduled from {} {} to {} {}",
            date_key(self.original_date),
            self.original_time,
            date_key(new_date),
            new_time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> AppointmentDraft {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let time = ClockTime::from_hm(9, 0).unwrap();
        AppointmentDraft::new(
            DraftId::from_parts(date, time, 1),
            date,
            time,
            AppointmentDuration::Minutes30,
        )
    }

    #[test]
    fn test_new_draft_defaults() {
        let d = draft();
        assert_eq!(d.visit_type, Some(VisitType::RegularVisit));
        assert_eq!(d.color_tag, ColorTag::Green);
        assert!(d.notes.is_empty());
        assert!(!d.is_complete());
    }

    #[test]
    fn test_draft_complete_with_patient() {
        let mut d = draft();
        d.patient_id = Some(PatientId::new("P1").unwrap());
        assert!(d.is_complete());
        d.visit_type = None;
        assert!(!d.is_complete());
    }

    #[test]
    fn test_visit_type_resets_manual_color() {
        let mut d = draft();
        d.color_tag = ColorTag::White;
        d.set_visit_type(VisitType::Emergency);
        assert_eq!(d.color_tag, ColorTag::Red);
    }

    #[test]
    fn test_reschedule_notes_and_action() {
        let ctx = RescheduleContext {
            appointment_id: AppointmentId::new("apt-9").unwrap(),
            patient_id: PatientId::new("P7").unwrap(),
            patient_display_name: "Sam Lee".to_string(),
            original_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            original_time: ClockTime::from_hm(9, 0).unwrap(),
            reason: "Patient travelling".to_string(),
        };
        assert_eq!(
            ctx.seed_notes(),
            "Rescheduled from 2024-06-10 at 09:00. Reason: Patient travelling"
        );
        assert_eq!(
            ctx.action_taken(
                NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
                ClockTime::from_hm(14, 30).unwrap()
            ),
            "Rescheduled from 2024-06-10 09:00 to 2024-06-12 14:30"
        );
    }

    #[test]
    fn test_slot_key_display() {
        assert_eq!(draft().slot_key().to_string(), "2024-06-10 09:00");
    }
}
