//! Submission results

use std::time::Duration;
use uuid::Uuid;

use crate::domain::{ApiError, AppointmentId, DraftId, PatientId, SlotKey};

/// Whether the wizard was creating new appointments or moving an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionMode {
    Create,
    Reschedule,
}

/// A draft the server accepted
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedDraft {
    pub draft_id: DraftId,
    pub appointment_id: AppointmentId,
    pub slot: SlotKey,
    pub patient_id: PatientId,
}

/// A draft the server refused or never answered for
#[derive(Debug)]
pub struct SubmissionFailure {
    /// Position of the draft in the submitted batch
    pub index: usize,
    pub draft_id: DraftId,
    pub slot: SlotKey,
    pub error: ApiError,
}

/// Outcome of one submission attempt
///
/// Successes are never rolled back when siblings fail.
#[derive(Debug)]
pub struct SubmissionReport {
    pub session_id: Uuid,
    pub mode: SubmissionMode,
    pub created: Vec<CreatedDraft>,
    pub failures: Vec<SubmissionFailure>,
    pub duration: Duration,
}

impl SubmissionReport {
    pub fn new(session_id: Uuid, mode: SubmissionMode) -> Self {
        Self {
            session_id,
            mode,
            created: Vec::new(),
            failures: Vec::new(),
            duration: Duration::from_secs(0),
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn total(&self) -> usize {
        self.created.len() + self.failures.len()
    }

    /// Every draft was accepted
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Some drafts were accepted and some were not
    pub fn is_partial(&self) -> bool {
        !self.created.is_empty() && !self.failures.is_empty()
    }

    pub fn failed_indices(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.index).collect()
    }

    /// One-line description of the failures, used as the surfaced wizard error
    pub fn failure_message(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let details: Vec<String> = self
            .failures
            .iter()
            .map(|f| format!("#{} {} ({})", f.index + 1, f.slot, f.error))
            .collect();
        Some(format!(
            "{} of {} appointment(s) failed: {}",
            self.failures.len(),
            self.total(),
            details.join("; ")
        ))
    }

    pub fn log_summary(&self) {
        crate::log_submission_complete!(
            self.session_id,
            self.created.len(),
            self.failures.len(),
            self.duration
        );

        for failure in &self.failures {
            tracing::warn!(
                session_id = %self.session_id,
                index = failure.index,
                draft_id = %failure.draft_id,
                slot = %failure.slot,
                error = %failure.error,
                "Appointment submission failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClockTime;
    use chrono::NaiveDate;

    fn slot() -> SlotKey {
        SlotKey::new(
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            ClockTime::from_hm(9, 0).unwrap(),
        )
    }

    fn created(n: u64) -> CreatedDraft {
        CreatedDraft {
            draft_id: DraftId::from_parts(slot().date, slot().time, n),
            appointment_id: AppointmentId::new(format!("apt-{n}")).unwrap(),
            slot: slot(),
            patient_id: PatientId::new(format!("P{n}")).unwrap(),
        }
    }

    fn failed(index: usize) -> SubmissionFailure {
        SubmissionFailure {
            index,
            draft_id: DraftId::from_parts(slot().date, slot().time, 99),
            slot: slot(),
            error: ApiError::ServerError {
                status: 500,
                message: "boom".to_string(),
            },
        }
    }

    #[test]
    fn test_empty_report_is_complete() {
        let report = SubmissionReport::new(Uuid::new_v4(), SubmissionMode::Create);
        assert!(report.is_complete());
        assert!(!report.is_partial());
        assert!(report.failure_message().is_none());
    }

    #[test]
    fn test_partial_report() {
        let mut report = SubmissionReport::new(Uuid::new_v4(), SubmissionMode::Create);
        report.created.push(created(1));
        report.failures.push(failed(1));

        assert!(report.is_partial());
        assert!(!report.is_complete());
        assert_eq!(report.total(), 2);
        assert_eq!(report.failed_indices(), vec![1]);

        let message = report.failure_message().unwrap();
        assert!(message.starts_with("1 of 2 appointment(s) failed"));
        assert!(message.contains("#2 2024-06-10 09:00"));
    }

    #[test]
    fn test_all_failed_is_not_partial() {
        let mut report = SubmissionReport::new(Uuid::new_v4(), SubmissionMode::Reschedule);
        report.failures.push(failed(0));
        assert!(!report.is_partial());
        assert!(!report.is_complete());
    }
}
