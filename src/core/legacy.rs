//! Versioned booking input
//!
//! Older callers send one detail record per `(date, time)` slot. Current
//! callers send a flat list of drafts where several may share a slot. Both
//! shapes carry an explicit `version` tag and normalize into a [`DraftSet`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::conflict::ConflictEvaluator;
use crate::core::drafts::{DraftField, DraftSet};
use crate::domain::{
    AppointmentDuration, ClockTime, ColorTag, PatientId, PatientSummary, SchedulingError, SlotKey,
    VisitType,
};

/// Booking request in either supported shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "version")]
pub enum AppointmentInput {
    /// One appointment per slot; a repeated slot replaces the earlier entry
    #[serde(rename = "v1")]
    SingleSlot { appointments: Vec<SlotEntry> },

    /// Any number of drafts per slot
    #[serde(rename = "v2")]
    Drafts { drafts: Vec<SlotEntry> },
}

/// Details for one appointment in a booking request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotEntry {
    pub date: NaiveDate,
    pub time: ClockTime,
    #[serde(default)]
    pub duration_minutes: Option<AppointmentDuration>,
    #[serde(default)]
    pub patient_id: Option<PatientId>,
    #[serde(default)]
    pub patient_display_name: Option<String>,
    #[serde(default)]
    pub visit_type: Option<VisitType>,
    #[serde(default)]
    pub color_tag: Option<ColorTag>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub chief_complaint: Option<String>,
}

impl AppointmentInput {
    /// Distinct dates referenced by the input, ascending
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.entries().iter().map(|e| e.date).collect();
        dates.sort();
        dates.dedup();
        dates
    }

    fn entries(&self) -> &[SlotEntry] {
        match self {
            AppointmentInput::SingleSlot { appointments } => appointments,
            AppointmentInput::Drafts { drafts } => drafts,
        }
    }

    /// Build a draft set, applying break rules to every entry
    pub fn into_draft_set(
        self,
        evaluator: &ConflictEvaluator<'_>,
        default_duration: AppointmentDuration,
    ) -> Result<DraftSet, SchedulingError> {
        let entries = match self {
            AppointmentInput::SingleSlot { appointments } => {
                let mut by_slot: BTreeMap<SlotKey, SlotEntry> = BTreeMap::new();
                for entry in appointments {
                    by_slot.insert(SlotKey::new(entry.date, entry.time), entry);
                }
                by_slot.into_values().collect()
            }
            AppointmentInput::Drafts { drafts } => drafts,
        };

        let mut set = DraftSet::new();
        for entry in entries {
            apply_entry(&mut set, entry, evaluator, default_duration)?;
        }
        Ok(set)
    }
}

fn apply_entry(
    set: &mut DraftSet,
    entry: SlotEntry,
    evaluator: &ConflictEvaluator<'_>,
    default_duration: AppointmentDuration,
) -> Result<(), SchedulingError> {
    let duration = entry.duration_minutes.unwrap_or(default_duration);
    let id = set.add_draft(entry.date, entry.time, evaluator, duration)?;

    if let Some(patient_id) = entry.patient_id {
        let display_name = entry
            .patient_display_name
            .unwrap_or_else(|| patient_id.to_string());
        set.update_draft(
            &id,
            DraftField::Patient(PatientSummary {
                id: patient_id,
                display_name,
                record_number: None,
                phone: None,
            }),
            evaluator,
        )?;
    }
    if let Some(visit_type) = entry.visit_type {
        set.update_draft(&id, DraftField::VisitType(visit_type), evaluator)?;
    }
    // An explicit color wins over the visit type default
    if let Some(color) = entry.color_tag {
        set.update_draft(&id, DraftField::ColorTag(color), evaluator)?;
    }
    if let Some(notes) = entry.notes {
        set.update_draft(&id, DraftField::Notes(notes), evaluator)?;
    }
    if entry.chief_complaint.is_some() {
        set.update_draft(&id, DraftField::ChiefComplaint(entry.chief_complaint), evaluator)?;
    }
    Ok(())
}
