//! Multi-appointment draft set
//!
//! Drafts are grouped into `(date, time)` buckets. A bucket may hold several
//! drafts (multi-patient slots) and is deleted as soon as it is empty.
//!
//! In reschedule mode the set holds exactly one draft at all times: it is
//! seeded from the [`RescheduleContext`], placements move it, and removal is
//! refused.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::core::conflict::ConflictEvaluator;
use crate::domain::{
    date_key, AppointmentDraft, AppointmentDuration, ClockTime, ColorTag, DraftId,
    PatientSummary, RescheduleContext, SchedulingError, SlotKey, VisitType,
};

/// One editable field of a draft
#[derive(Debug, Clone, PartialEq)]
pub enum DraftField {
    Patient(PatientSummary),
    ClearPatient,
    VisitType(VisitType),
    ColorTag(ColorTag),
    Duration(AppointmentDuration),
    Notes(String),
    ChiefComplaint(Option<String>),
}

impl DraftField {
    fn name(&self) -> &'static str {
        match self {
            DraftField::Patient(_) | DraftField::ClearPatient => "patient",
            DraftField::VisitType(_) => "visit_type",
            DraftField::ColorTag(_) => "color_tag",
            DraftField::Duration(_) => "duration",
            DraftField::Notes(_) => "notes",
            DraftField::ChiefComplaint(_) => "chief_complaint",
        }
    }
}

/// In-memory drafts keyed by slot
#[derive(Debug, Clone, Default)]
pub struct DraftSet {
    buckets: BTreeMap<SlotKey, Vec<AppointmentDraft>>,
    sequence: u64,
    reschedule: Option<RescheduleContext>,
}

impl DraftSet {
    /// Empty set for booking new appointments
    pub fn new() -> Self {
        Self::default()
    }

    /// Set holding the single draft for an existing appointment
    pub fn for_reschedule(context: RescheduleContext, duration: AppointmentDuration) -> Self {
        let mut set = Self {
            buckets: BTreeMap::new(),
            sequence: 0,
            reschedule: Some(context),
        };
        set.seed_reschedule(None, None, duration);
        set
    }

    pub fn is_reschedule(&self) -> bool {
        self.reschedule.is_some()
    }

    pub fn reschedule_context(&self) -> Option<&RescheduleContext> {
        self.reschedule.as_ref()
    }

    /// Add a draft with default fields at `(date, time)`
    ///
    /// Rejected when the placement is blocked by a break; the set is left
    /// untouched in that case. In reschedule mode the single draft is moved
    /// here instead, keeping its fields.
    pub fn add_draft(
        &mut self,
        date: NaiveDate,
        time: ClockTime,
        evaluator: &ConflictEvaluator<'_>,
        duration: AppointmentDuration,
    ) -> Result<DraftId, SchedulingError> {
        if self.is_reschedule() {
            let current = self.drafts().next().map(|d| d.id.clone());
            if let Some(current) = current {
                return self.move_draft(&current, date, time, evaluator);
            }
        }

        check_break(evaluator, time, duration)?;

        let id = self.next_id(date, time);
        let draft = AppointmentDraft::new(id.clone(), date, time, duration);
        self.insert(draft);

        tracing::debug!(draft_id = %id, date = %date_key(date), time = %time, "Draft added");
        Ok(id)
    }

    /// Remove a draft; an emptied bucket is deleted
    pub fn remove_draft(&mut self, id: &DraftId) -> Result<AppointmentDraft, SchedulingError> {
        if self.is_reschedule() {
            return Err(SchedulingError::RescheduleSingleDraft(
                "the appointment being rescheduled cannot be removed".to_string(),
            ));
        }
        self.take(id)
    }

    /// Set one field of a draft
    ///
    /// A visit type change always resets the color tag. A duration change is
    /// re-checked against breaks under the full-interval policy.
    pub fn update_draft(
        &mut self,
        id: &DraftId,
        field: DraftField,
        evaluator: &ConflictEvaluator<'_>,
    ) -> Result<(), SchedulingError> {
        let field_name = field.name();
        let draft = self
            .get_mut(id)
            .ok_or_else(|| SchedulingError::DraftNotFound(id.to_string()))?;

        match field {
            DraftField::Patient(patient) => {
                draft.patient_id = Some(patient.id);
                draft.patient_display_name = Some(patient.display_name);
            }
            DraftField::ClearPatient => {
                draft.patient_id = None;
                draft.patient_display_name = None;
            }
            DraftField::VisitType(visit_type) => draft.set_visit_type(visit_type),
            DraftField::ColorTag(color) => draft.color_tag = color,
            DraftField::Duration(duration) => {
                check_break(evaluator, draft.time, duration)?;
                draft.duration = duration;
            }
            DraftField::Notes(notes) => draft.notes = notes,
            DraftField::ChiefComplaint(complaint) => {
                draft.chief_complaint = complaint.filter(|c| !c.trim().is_empty());
            }
        }

        tracing::trace!(draft_id = %id, field = field_name, "Draft updated");
        Ok(())
    }

    /// Move a draft to another slot, carrying its patient, visit type, notes and duration
    ///
    /// The moved draft gets a fresh id.
    pub fn move_draft(
        &mut self,
        id: &DraftId,
        new_date: NaiveDate,
        new_time: ClockTime,
        evaluator: &ConflictEvaluator<'_>,
    ) -> Result<DraftId, SchedulingError> {
        let duration = self
            .get(id)
            .map(|d| d.duration)
            .ok_or_else(|| SchedulingError::DraftNotFound(id.to_string()))?;
        check_break(evaluator, new_time, duration)?;

        let old = self.take(id)?;
        let new_id = self.next_id(new_date, new_time);
        let mut moved = AppointmentDraft::new(new_id.clone(), new_date, new_time, duration);
        moved.patient_id = old.patient_id;
        moved.patient_display_name = old.patient_display_name;
        moved.visit_type = old.visit_type;
        moved.color_tag = old.color_tag;
        moved.notes = old.notes;
        moved.chief_complaint = old.chief_complaint;
        self.insert(moved);

        tracing::debug!(
            from = %id,
            to = %new_id,
            date = %date_key(new_date),
            time = %new_time,
            "Draft moved"
        );
        Ok(new_id)
    }

    /// Drop every draft in one bucket, returning how many were removed
    pub fn clear_slot(&mut self, key: SlotKey) -> Result<usize, SchedulingError> {
        if self.is_reschedule() {
            return Err(SchedulingError::RescheduleSingleDraft(
                "the appointment being rescheduled cannot be cleared".to_string(),
            ));
        }
        Ok(self.buckets.remove(&key).map(|b| b.len()).unwrap_or(0))
    }

    /// Reset for a new date selection
    ///
    /// Normal mode drops every draft. Reschedule mode seeds a fresh draft at
    /// the original time on the first selected date, or at the end of the
    /// break that blocks the original time.
    pub fn reset_for_dates(
        &mut self,
        dates: &[NaiveDate],
        duration: AppointmentDuration,
        evaluator: &ConflictEvaluator<'_>,
    ) {
        self.buckets.clear();
        if self.is_reschedule() {
            let time = self
                .reschedule
                .as_ref()
                .map(|c| first_unblocked(evaluator, c.original_time, duration));
            self.seed_reschedule(dates.first().copied(), time, duration);
        }
    }

    /// Drop drafts that were persisted; used after a partial submission
    pub fn remove_submitted(&mut self, ids: &[DraftId]) {
        for bucket in self.buckets.values_mut() {
            bucket.retain(|d| !ids.contains(&d.id));
        }
        self.buckets.retain(|_, bucket| !bucket.is_empty());
    }

    pub fn get(&self, id: &DraftId) -> Option<&AppointmentDraft> {
        self.drafts().find(|d| &d.id == id)
    }

    /// Drafts in slot order, then insertion order within a slot
    pub fn drafts(&self) -> impl Iterator<Item = &AppointmentDraft> {
        self.buckets.values().flatten()
    }

    pub fn drafts_in(&self, key: SlotKey) -> &[AppointmentDraft] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn slot_count(&self) -> usize {
        self.buckets.len()
    }

    /// Ids of drafts missing a patient or visit type
    pub fn incomplete_ids(&self) -> Vec<String> {
        self.drafts()
            .filter(|d| !d.is_complete())
            .map(|d| d.id.to_string())
            .collect()
    }

    /// `{YYYY-MM-DD: [HH:MM, ...]}` with times ascending and no empty lists
    pub fn to_selected_time_slots_map(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for key in self.buckets.keys() {
            map.entry(key.date_key()).or_default().push(key.time.to_string());
        }
        map
    }

    fn seed_reschedule(
        &mut self,
        date: Option<NaiveDate>,
        time: Option<ClockTime>,
        duration: AppointmentDuration,
    ) {
        let Some(context) = self.reschedule.clone() else {
            return;
        };
        let date = date.unwrap_or(context.original_date);
        let time = time.unwrap_or(context.original_time);
        if time != context.original_time {
            tracing::warn!(
                original = %context.original_time,
                seeded = %time,
                "Original time falls in a break; reschedule draft placed after it"
            );
        }
        let id = self.next_id(date, time);
        let notes = context.seed_notes();
        let mut draft = AppointmentDraft::new(id, date, time, duration);
        draft.patient_id = Some(context.patient_id);
        draft.patient_display_name = Some(context.patient_display_name);
        draft.notes = notes;
        self.insert(draft);
    }

    fn next_id(&mut self, date: NaiveDate, time: ClockTime) -> DraftId {
        self.sequence += 1;
        DraftId::from_parts(date, time, self.sequence)
    }

    fn insert(&mut self, draft: AppointmentDraft) {
        self.buckets.entry(draft.slot_key()).or_default().push(draft);
    }

    fn get_mut(&mut self, id: &DraftId) -> Option<&mut AppointmentDraft> {
        self.buckets.values_mut().flatten().find(|d| &d.id == id)
    }

    fn take(&mut self, id: &DraftId) -> Result<AppointmentDraft, SchedulingError> {
        let key = self
            .get(id)
            .map(AppointmentDraft::slot_key)
            .ok_or_else(|| SchedulingError::DraftNotFound(id.to_string()))?;

        let bucket = self
            .buckets
            .get_mut(&key)
            .ok_or_else(|| SchedulingError::DraftNotFound(id.to_string()))?;
        let position = bucket
            .iter()
            .position(|d| &d.id == id)
            .ok_or_else(|| SchedulingError::DraftNotFound(id.to_string()))?;
        let draft = bucket.remove(position);
        if bucket.is_empty() {
            self.buckets.remove(&key);
        }
        Ok(draft)
    }
}

fn check_break(
    evaluator: &ConflictEvaluator<'_>,
    time: ClockTime,
    duration: AppointmentDuration,
) -> Result<(), SchedulingError> {
    match evaluator.blocking_break(time, duration.minutes()) {
        Some(period) => Err(SchedulingError::DuringBreak {
            time: time.to_string(),
            break_name: period.name.clone(),
        }),
        None => Ok(()),
    }
}

/// Earliest start at or after `time` that no break blocks
fn first_unblocked(
    evaluator: &ConflictEvaluator<'_>,
    time: ClockTime,
    duration: AppointmentDuration,
) -> ClockTime {
    let mut time = time;
    while let Some(period) = evaluator.blocking_break(time, duration.minutes()) {
        if period.end <= time {
            break;
        }
        time = period.end;
    }
    time
}
