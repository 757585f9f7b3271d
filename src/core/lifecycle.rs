//! Appointment status lifecycle outside the booking wizard
//!
//! Status changes are validated locally against the transition table before
//! any request is sent. Cancellation also writes an audit ledger entry; a
//! ledger failure is logged and never fails the cancellation.

use std::sync::Arc;

use crate::adapters::clinic::{AppointmentApi, LedgerEntry};
use crate::domain::{AppointmentId, AppointmentStatus, Result, SchedulingError};

/// Statuses reachable from `from` in one step
pub fn valid_transitions(from: AppointmentStatus) -> &'static [AppointmentStatus] {
    use AppointmentStatus::*;
    match from {
        Scheduled => &[CheckedIn, Cancelled, Rescheduled],
        CheckedIn => &[InProgress, Cancelled],
        InProgress => &[Completed],
        Completed => &[CheckedOut],
        Rescheduled => &[Scheduled, Cancelled],
        CheckedOut | Cancelled => &[],
    }
}

pub fn is_terminal(status: AppointmentStatus) -> bool {
    valid_transitions(status).is_empty()
}

/// # Errors
///
/// [`SchedulingError::InvalidStatusTransition`] when `to` is not reachable
/// from `from`.
pub fn validate_transition(
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> std::result::Result<(), SchedulingError> {
    if valid_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(SchedulingError::InvalidStatusTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// Drives status changes and cancellations against the clinic API
pub struct AppointmentLifecycle {
    api: Arc<dyn AppointmentApi>,
    ledger_enabled: bool,
}

impl AppointmentLifecycle {
    pub fn new(api: Arc<dyn AppointmentApi>, ledger_enabled: bool) -> Self {
        Self {
            api,
            ledger_enabled,
        }
    }

    /// Move an appointment to `to`, returning its previous status
    pub async fn change_status(
        &self,
        id: &AppointmentId,
        to: AppointmentStatus,
    ) -> Result<AppointmentStatus> {
        let current = self.api.appointment(id).await?;
        validate_transition(current.status, to)?;

        self.api.update_status(id, to).await?;
        tracing::info!(
            appointment_id = %id,
            from = %current.status,
            to = %to,
            "Appointment status changed"
        );
        Ok(current.status)
    }

    /// Cancel an appointment and record the reason in the ledger
    pub async fn cancel(&self, id: &AppointmentId, reason: &str) -> Result<()> {
        let current = self.api.appointment(id).await?;
        validate_transition(current.status, AppointmentStatus::Cancelled)?;

        self.api
            .update_status(id, AppointmentStatus::Cancelled)
            .await?;
        tracing::info!(appointment_id = %id, from = %current.status, "Appointment cancelled");

        let details = if reason.trim().is_empty() {
            format!("Cancelled (was {})", current.status)
        } else {
            format!("Cancelled (was {}). Reason: {}", current.status, reason.trim())
        };
        self.record(LedgerEntry::new(
            id.clone(),
            current.patient_id,
            "appointment_cancelled",
            details,
        ))
        .await;
        Ok(())
    }

    /// Best-effort audit write
    pub(crate) async fn record(&self, entry: LedgerEntry) {
        record_ledger(self.api.as_ref(), self.ledger_enabled, entry).await;
    }
}

/// Post an audit entry, downgrading any failure to a warning
pub(crate) async fn record_ledger(api: &dyn AppointmentApi, enabled: bool, entry: LedgerEntry) {
    if !enabled {
        tracing::debug!(action = %entry.action, "Ledger disabled, entry skipped");
        return;
    }
    if let Err(e) = api.record_ledger_entry(&entry).await {
        tracing::warn!(
            appointment_id = %entry.appointment_id,
            action = %entry.action,
            error = %e,
            "Failed to record ledger entry"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clinic::InMemoryClinicApi;
    use crate::domain::{ClockTime, ExistingAppointment, PatientId, SlotwiseError};
    use chrono::NaiveDate;
    use test_case::test_case;

    use AppointmentStatus::*;

    #[test_case(Scheduled, CheckedIn, true)]
    #[test_case(Scheduled, Completed, false ; "scheduled cannot skip to completed")]
    #[test_case(CheckedIn, InProgress, true)]
    #[test_case(InProgress, Cancelled, false ; "in progress cannot be cancelled")]
    #[test_case(Completed, CheckedOut, true)]
    #[test_case(Rescheduled, Scheduled, true)]
    #[test_case(CheckedOut, Scheduled, false ; "checked out is terminal")]
    #[test_case(Cancelled, Scheduled, false ; "cancelled is terminal")]
    fn test_transition_table(from: AppointmentStatus, to: AppointmentStatus, allowed: bool) {
        assert_eq!(validate_transition(from, to).is_ok(), allowed);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(is_terminal(CheckedOut));
        assert!(is_terminal(Cancelled));
        assert!(!is_terminal(Scheduled));
    }

    fn api_with(status: AppointmentStatus) -> Arc<InMemoryClinicApi> {
        Arc::new(InMemoryClinicApi::new().with_appointments(vec![ExistingAppointment {
            id: AppointmentId::new("apt-1").unwrap(),
            patient_id: Some(PatientId::new("P1").unwrap()),
            patient_display_name: "Ana Silva".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            time: ClockTime::from_hm(9, 0).unwrap(),
            duration_minutes: 30,
            visit_type: None,
            status,
        }]))
    }

    #[tokio::test]
    async fn test_cancel_records_ledger_entry() {
        let api = api_with(Scheduled);
        let lifecycle = AppointmentLifecycle::new(api.clone(), true);
        let id = AppointmentId::new("apt-1").unwrap();

        lifecycle.cancel(&id, "Patient called").await.unwrap();

        assert_eq!(api.status_changes(), vec![(id.clone(), Cancelled)]);
        let ledger = api.ledger_entries();
        assert_eq!(ledger.len(), 1);
        assert!(ledger[0].details.contains("Patient called"));
        assert_eq!(ledger[0].patient_id, Some(PatientId::new("P1").unwrap()));
    }

    #[tokio::test]
    async fn test_cancel_succeeds_when_ledger_fails() {
        let api = api_with(Scheduled);
        api.fail_ledger();
        let lifecycle = AppointmentLifecycle::new(api.clone(), true);
        let id = AppointmentId::new("apt-1").unwrap();

        assert!(lifecycle.cancel(&id, "").await.is_ok());
        assert_eq!(api.stored(&id).unwrap().status, Cancelled);
        assert!(api.ledger_entries().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_skips_ledger_when_disabled() {
        let api = api_with(Scheduled);
        let lifecycle = AppointmentLifecycle::new(api.clone(), false);
        lifecycle
            .cancel(&AppointmentId::new("apt-1").unwrap(), "x")
            .await
            .unwrap();
        assert!(api.ledger_entries().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_transition_sends_nothing() {
        let api = api_with(CheckedOut);
        let lifecycle = AppointmentLifecycle::new(api.clone(), true);
        let result = lifecycle
            .cancel(&AppointmentId::new("apt-1").unwrap(), "late")
            .await;

        assert!(matches!(
            result,
            Err(SlotwiseError::Scheduling(SchedulingError::InvalidStatusTransition { .. }))
        ));
        assert!(api.status_changes().is_empty());
    }

    #[tokio::test]
    async fn test_change_status_returns_previous() {
        let api = api_with(CheckedIn);
        let lifecycle = AppointmentLifecycle::new(api.clone(), true);
        let previous = lifecycle
            .change_status(&AppointmentId::new("apt-1").unwrap(), InProgress)
            .await
            .unwrap();
        assert_eq!(previous, CheckedIn);
    }

    #[tokio::test]
    async fn test_unknown_appointment() {
        let api = api_with(Scheduled);
        let lifecycle = AppointmentLifecycle::new(api, true);
        let result = lifecycle
            .change_status(&AppointmentId::new("missing").unwrap(), CheckedIn)
            .await;
        assert!(matches!(result, Err(SlotwiseError::Api(_))));
    }
}
