//! Scheduling wizard controller
//!
//! One [`SchedulingWorkflow`] owns the date selection, the availability
//! snapshot and the draft set for a single booking session. Every state
//! change is a synchronous `&mut self` method; only loading, patient search
//! and submission talk to the clinic API.

use chrono::NaiveDate;
use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use super::step::WizardStep;
use super::submission::{CreatedDraft, SubmissionFailure, SubmissionMode, SubmissionReport};
use crate::adapters::clinic::{
    AppointmentApi, AppointmentUpdateRequest, LedgerEntry, NewAppointmentRequest,
};
use crate::core::availability::{fetch_ticket, AvailabilityStore, DateLoad, LoadTicket};
use crate::core::conflict::{occupying, ConflictEvaluator, Placement};
use crate::core::drafts::{DraftField, DraftSet};
use crate::core::legacy::AppointmentInput;
use crate::core::lifecycle::record_ledger;
use crate::core::schedule::ScheduleConfiguration;
use crate::domain::{
    date_key, AppointmentDraft, AppointmentDuration, ClockTime, DraftId, ExistingAppointment,
    PatientSummary, RescheduleContext, Result, SchedulingError, SlotKey,
};

/// One row of the time-slot grid
#[derive(Debug, Clone, PartialEq)]
pub struct SlotView {
    pub time: ClockTime,
    /// Non-cancelled appointments overlapping this slot at the selected duration
    pub occupied_by: Vec<ExistingAppointment>,
    pub break_name: Option<String>,
    pub draft_count: usize,
}

impl SlotView {
    pub fn is_blocked(&self) -> bool {
        self.break_name.is_some()
    }

    pub fn is_occupied(&self) -> bool {
        !self.occupied_by.is_empty()
    }
}

/// Controller for one scheduling session
pub struct SchedulingWorkflow {
    session_id: Uuid,
    api: Arc<dyn AppointmentApi>,
    schedule: ScheduleConfiguration,
    step: WizardStep,
    selected_dates: BTreeSet<NaiveDate>,
    availability: AvailabilityStore,
    drafts: DraftSet,
    duration: AppointmentDuration,
    ledger_enabled: bool,
    last_error: Option<String>,
}

impl SchedulingWorkflow {
    /// Session for booking new appointments
    pub fn new(api: Arc<dyn AppointmentApi>, schedule: ScheduleConfiguration) -> Self {
        let duration = schedule.default_duration;
        Self {
            session_id: Uuid::new_v4(),
            api,
            schedule,
            step: WizardStep::SelectingDates,
            selected_dates: BTreeSet::new(),
            availability: AvailabilityStore::new(),
            drafts: DraftSet::new(),
            duration,
            ledger_enabled: true,
            last_error: None,
        }
    }

    /// Session moving one existing appointment
    ///
    /// The original date is preselected and the single draft is seeded at the
    /// original time with the context's patient.
    pub fn for_reschedule(
        api: Arc<dyn AppointmentApi>,
        schedule: ScheduleConfiguration,
        context: RescheduleContext,
    ) -> Self {
        let mut workflow = Self::new(api, schedule);
        workflow.selected_dates.insert(context.original_date);
        workflow.drafts = DraftSet::for_reschedule(context, workflow.duration);
        workflow
    }

    pub fn with_ledger(mut self, enabled: bool) -> Self {
        self.ledger_enabled = enabled;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_reschedule(&self) -> bool {
        self.drafts.is_reschedule()
    }

    pub fn schedule(&self) -> &ScheduleConfiguration {
        &self.schedule
    }

    pub fn selected_dates(&self) -> Vec<NaiveDate> {
        self.selected_dates.iter().copied().collect()
    }

    pub fn drafts(&self) -> &DraftSet {
        &self.drafts
    }

    pub fn availability(&self) -> &AvailabilityStore {
        &self.availability
    }

    /// Duration given to newly placed drafts
    pub fn selected_duration(&self) -> AppointmentDuration {
        self.duration
    }

    pub fn set_selected_duration(&mut self, duration: AppointmentDuration) {
        self.duration = duration;
    }

    /// Message from the last failed submission, cleared on success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // Date selection

    /// Add or remove one date
    ///
    /// In reschedule mode selection is single-select: the date replaces the
    /// current one.
    pub fn toggle_date(&mut self, date: NaiveDate) -> Result<()> {
        self.ensure_open()?;

        if self.is_reschedule() {
            return self.select_dates(&[date]);
        }

        if !self.selected_dates.remove(&date) {
            self.selected_dates.insert(date);
        }
        self.on_dates_changed();
        Ok(())
    }

    /// Replace the whole date selection
    pub fn select_dates(&mut self, dates: &[NaiveDate]) -> Result<()> {
        self.ensure_open()?;

        let next: BTreeSet<NaiveDate> = dates.iter().copied().collect();
        if self.is_reschedule() && next.len() > 1 {
            return Err(SchedulingError::RescheduleSingleDraft(
                "select exactly one date".to_string(),
            )
            .into());
        }
        if next == self.selected_dates {
            return Ok(());
        }

        self.selected_dates = next;
        self.on_dates_changed();
        Ok(())
    }

    fn on_dates_changed(&mut self) {
        self.availability.invalidate();
        let dates = self.selected_dates();
        let evaluator = ConflictEvaluator::new(&self.schedule);
        self.drafts.reset_for_dates(&dates, self.duration, &evaluator);
        self.last_error = None;

        self.step = if dates.is_empty() {
            WizardStep::SelectingDates
        } else {
            self.step.min(WizardStep::SelectingTimeSlots)
        };

        tracing::debug!(
            session_id = %self.session_id,
            dates = dates.len(),
            epoch = self.availability.epoch(),
            "Date selection changed"
        );
    }

    // Navigation

    /// Move to the next step
    pub fn advance(&mut self) -> Result<WizardStep> {
        let target = self.step.next().ok_or(SchedulingError::AlreadySubmitted)?;
        self.go_to(target)
    }

    /// Jump to `target`
    ///
    /// Going back is always allowed and keeps forward state. Going forward
    /// checks the guard of every step on the way.
    pub fn go_to(&mut self, target: WizardStep) -> Result<WizardStep> {
        self.ensure_open()?;

        if target == WizardStep::Submitted {
            return Err(not_reachable(target, "submit the appointments instead"));
        }

        if target > self.step {
            let mut step = self.step;
            while let Some(next) = step.next() {
                if next > target {
                    break;
                }
                self.guard(next)?;
                step = next;
            }
        }

        if target != self.step {
            tracing::debug!(
                session_id = %self.session_id,
                from = %self.step,
                to = %target,
                "Wizard step changed"
            );
        }
        self.step = target;
        Ok(self.step)
    }

    fn guard(&self, target: WizardStep) -> Result<()> {
        match target {
            WizardStep::SelectingDates => Ok(()),
            WizardStep::SelectingTimeSlots if self.selected_dates.is_empty() => {
                Err(not_reachable(target, "select at least one date"))
            }
            WizardStep::EnteringDetails if self.drafts.is_empty() => {
                Err(not_reachable(target, "select at least one time slot"))
            }
            WizardStep::Confirming => {
                let incomplete = self.drafts.incomplete_ids();
                if incomplete.is_empty() {
                    Ok(())
                } else {
                    Err(SchedulingError::IncompleteDrafts(incomplete).into())
                }
            }
            _ => Ok(()),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.step.is_terminal() {
            return Err(SchedulingError::AlreadySubmitted.into());
        }
        Ok(())
    }

    fn ensure_selected(&self, date: NaiveDate) -> Result<()> {
        if self.selected_dates.contains(&date) {
            Ok(())
        } else {
            Err(SchedulingError::DateNotSelected(date_key(date)).into())
        }
    }

    // Availability

    /// Ticket for loading the current selection
    pub fn begin_availability_load(&self) -> LoadTicket {
        self.availability.begin_load(&self.selected_dates())
    }

    /// Apply loaded results; `false` if the selection changed meanwhile
    pub fn apply_availability(&mut self, ticket: &LoadTicket, results: Vec<DateLoad>) -> bool {
        self.availability.complete_load(ticket, results)
    }

    /// Load existing appointments for every selected date, one date at a time
    pub async fn refresh_availability(&mut self) -> bool {
        let ticket = self.begin_availability_load();
        let results = fetch_ticket(self.api.as_ref(), &ticket).await;
        self.apply_availability(&ticket, results)
    }

    /// Placement check against the loaded snapshot
    pub fn placement(&self, date: NaiveDate, time: ClockTime) -> Placement {
        ConflictEvaluator::new(&self.schedule).evaluate(
            date,
            time,
            self.duration.minutes(),
            &self.availability,
        )
    }

    /// Grid of anchors for one date at the selected duration
    pub fn slot_grid_for(&self, date: NaiveDate) -> Vec<SlotView> {
        let evaluator = ConflictEvaluator::new(&self.schedule);
        let minutes = self.duration.minutes();
        let existing = self.availability.appointments_on(date);

        self.schedule
            .slot_anchors()
            .into_iter()
            .map(|time| SlotView {
                time,
                occupied_by: occupying(date, time, minutes, existing)
                    .into_iter()
                    .cloned()
                    .collect(),
                break_name: evaluator.blocking_break(time, minutes).map(|b| b.name.clone()),
                draft_count: self.drafts.drafts_in(SlotKey::new(date, time)).len(),
            })
            .collect()
    }

    // Time slots and drafts

    /// Place a draft on a grid anchor or any other valid time
    ///
    /// Occupied slots are allowed; only breaks block the placement.
    pub fn select_time_slot(&mut self, date: NaiveDate, time: ClockTime) -> Result<DraftId> {
        self.ensure_open()?;
        self.ensure_selected(date)?;

        let evaluator = ConflictEvaluator::new(&self.schedule);
        let placement =
            evaluator.evaluate(date, time, self.duration.minutes(), &self.availability);
        if let Placement::Occupied { appointment_ids } = &placement {
            tracing::debug!(
                date = %date_key(date),
                time = %time,
                overlapping = appointment_ids.len(),
                "Placing draft on an occupied slot"
            );
        }

        let id = self.drafts.add_draft(date, time, &evaluator, self.duration)?;
        self.reconcile_step();
        Ok(id)
    }

    /// Place a draft at a manually typed `HH:MM` time
    pub fn add_custom_time_slot(&mut self, date: NaiveDate, input: &str) -> Result<DraftId> {
        let time = ClockTime::parse_manual(input)?;
        self.select_time_slot(date, time)
    }

    /// Drop every draft at `(date, time)`
    pub fn clear_time_slot(&mut self, date: NaiveDate, time: ClockTime) -> Result<usize> {
        self.ensure_open()?;
        let removed = self.drafts.clear_slot(SlotKey::new(date, time))?;
        self.reconcile_step();
        Ok(removed)
    }

    pub fn remove_draft(&mut self, id: &DraftId) -> Result<AppointmentDraft> {
        self.ensure_open()?;
        let removed = self.drafts.remove_draft(id)?;
        self.reconcile_step();
        Ok(removed)
    }

    pub fn move_draft(&mut self, id: &DraftId, date: NaiveDate, time: ClockTime) -> Result<DraftId> {
        self.ensure_open()?;
        self.ensure_selected(date)?;
        let evaluator = ConflictEvaluator::new(&self.schedule);
        let moved = self.drafts.move_draft(id, date, time, &evaluator)?;
        self.reconcile_step();
        Ok(moved)
    }

    pub fn update_draft(&mut self, id: &DraftId, field: DraftField) -> Result<()> {
        self.ensure_open()?;
        let evaluator = ConflictEvaluator::new(&self.schedule);
        self.drafts.update_draft(id, field, &evaluator)?;
        self.reconcile_step();
        Ok(())
    }

    pub fn assign_patient(&mut self, id: &DraftId, patient: PatientSummary) -> Result<()> {
        self.update_draft(id, DraftField::Patient(patient))
    }

    /// Patient lookup; a blank query returns nothing without calling the API
    pub async fn search_patients(&self, query: &str) -> Result<Vec<PatientSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.api.search_patients(query).await?)
    }

    /// Replace drafts and dates with a versioned input document
    ///
    /// The wizard is left unchanged when any entry is rejected.
    pub fn load_input(&mut self, input: AppointmentInput) -> Result<usize> {
        self.ensure_open()?;
        if self.is_reschedule() {
            return Err(SchedulingError::RescheduleSingleDraft(
                "input documents cannot be loaded while rescheduling".to_string(),
            )
            .into());
        }

        let dates = input.dates();
        let evaluator = ConflictEvaluator::new(&self.schedule);
        let drafts = input.into_draft_set(&evaluator, self.duration)?;

        self.selected_dates = dates.into_iter().collect();
        self.availability.invalidate();
        self.drafts = drafts;
        self.last_error = None;
        self.step = if self.selected_dates.is_empty() {
            WizardStep::SelectingDates
        } else {
            WizardStep::SelectingTimeSlots
        };

        tracing::info!(
            session_id = %self.session_id,
            drafts = self.drafts.len(),
            slots = self.drafts.slot_count(),
            "Loaded appointment input"
        );
        Ok(self.drafts.len())
    }

    /// Step back to the latest step the draft set still satisfies
    fn reconcile_step(&mut self) {
        let target = if self.drafts.is_empty() {
            WizardStep::SelectingTimeSlots
        } else if !self.drafts.incomplete_ids().is_empty() {
            WizardStep::EnteringDetails
        } else {
            return;
        };
        if self.step > target {
            tracing::debug!(
                session_id = %self.session_id,
                from = %self.step,
                to = %target,
                "Draft change moved the wizard back"
            );
            self.step = target;
        }
    }

    // Submission

    /// Send the drafts to the clinic API
    ///
    /// Local problems (wrong step, incomplete drafts) are returned as errors
    /// and nothing is sent. Remote failures are reported per draft: accepted
    /// drafts leave the set, rejected ones stay, and the wizard remains in
    /// [`WizardStep::Confirming`] until everything has been accepted.
    pub async fn submit(&mut self) -> Result<SubmissionReport> {
        match self.step {
            WizardStep::Submitted => return Err(SchedulingError::AlreadySubmitted.into()),
            WizardStep::Confirming => {}
            other => return Err(SchedulingError::NotConfirming(other.to_string()).into()),
        }
        self.guard(WizardStep::Confirming)?;

        let report = if self.is_reschedule() {
            self.submit_reschedule().await?
        } else {
            self.submit_new().await?
        };

        report.log_summary();
        if report.is_complete() {
            self.last_error = None;
            self.step = WizardStep::Submitted;
        } else {
            self.last_error = report.failure_message();
        }
        Ok(report)
    }

    async fn submit_new(&mut self) -> Result<SubmissionReport> {
        let started = Instant::now();
        let batch: Vec<AppointmentDraft> = self.drafts.drafts().cloned().collect();
        let requests = batch
            .iter()
            .map(NewAppointmentRequest::from_draft)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        crate::log_submission_start!(self.session_id, requests.len(), "create");

        let api = Arc::clone(&self.api);
        let results = join_all(requests.iter().map(|request| api.create_appointment(request))).await;

        let mut report = SubmissionReport::new(self.session_id, SubmissionMode::Create);
        for (index, ((draft, request), result)) in
            batch.into_iter().zip(requests).zip(results).enumerate()
        {
            match result {
                Ok(appointment_id) => report.created.push(CreatedDraft {
                    slot: draft.slot_key(),
                    draft_id: draft.id,
                    appointment_id,
                    patient_id: request.patient_id,
                }),
                Err(error) => report.failures.push(SubmissionFailure {
                    index,
                    slot: draft.slot_key(),
                    draft_id: draft.id,
                    error,
                }),
            }
        }

        let accepted: Vec<DraftId> = report.created.iter().map(|c| c.draft_id.clone()).collect();
        self.drafts.remove_submitted(&accepted);

        Ok(report.with_duration(started.elapsed()))
    }

    async fn submit_reschedule(&mut self) -> Result<SubmissionReport> {
        let started = Instant::now();
        let (Some(context), Some(draft)) = (self.drafts.reschedule_context(), self.drafts.drafts().next())
        else {
            return Err(SchedulingError::RescheduleSingleDraft(
                "no draft to reschedule".to_string(),
            )
            .into());
        };
        let context = context.clone();
        let draft = draft.clone();
        let request = AppointmentUpdateRequest::reschedule(&draft, &context)?;

        crate::log_submission_start!(self.session_id, 1, "reschedule");

        let mut report = SubmissionReport::new(self.session_id, SubmissionMode::Reschedule);
        match self
            .api
            .update_appointment(&context.appointment_id, &request)
            .await
        {
            Ok(()) => {
                record_ledger(
                    self.api.as_ref(),
                    self.ledger_enabled,
                    LedgerEntry::new(
                        context.appointment_id.clone(),
                        Some(context.patient_id.clone()),
                        "appointment_rescheduled",
                        request.action_taken.clone(),
                    ),
                )
                .await;
                report.created.push(CreatedDraft {
                    slot: draft.slot_key(),
                    draft_id: draft.id,
                    appointment_id: context.appointment_id,
                    patient_id: context.patient_id,
                });
            }
            Err(error) => report.failures.push(SubmissionFailure {
                index: 0,
                slot: draft.slot_key(),
                draft_id: draft.id,
                error,
            }),
        }

        Ok(report.with_duration(started.elapsed()))
    }
}

fn not_reachable(target: WizardStep, reason: &str) -> crate::domain::SlotwiseError {
    SchedulingError::StepNotReachable {
        target: target.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
