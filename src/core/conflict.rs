//! Slot conflict evaluation
//!
//! Occupancy is judged against the client's last snapshot of existing
//! appointments. It is advisory only: the snapshot may be stale and the
//! clinic backend remains the sole authority on double-booking.

use chrono::NaiveDate;

use crate::core::availability::AvailabilityStore;
use crate::core::schedule::{BreakOverlapPolicy, BreakPeriod, ScheduleConfiguration};
use crate::domain::{AppointmentId, ClockTime, ExistingAppointment};

/// True iff a non-cancelled appointment on `date` overlaps `[time, time + duration)`
///
/// Intervals are closed-open, so back-to-back appointments do not collide.
pub fn is_occupied(
    date: NaiveDate,
    time: ClockTime,
    duration_minutes: u32,
    existing: &[ExistingAppointment],
) -> bool {
    !occupying(date, time, duration_minutes, existing).is_empty()
}

/// Appointments that overlap the candidate interval
pub fn occupying<'a>(
    date: NaiveDate,
    time: ClockTime,
    duration_minutes: u32,
    existing: &'a [ExistingAppointment],
) -> Vec<&'a ExistingAppointment> {
    let start = time.minutes();
    let end = time.end_minutes(duration_minutes);
    existing
        .iter()
        .filter(|apt| apt.date == date && !apt.is_cancelled() && apt.overlaps(start, end))
        .collect()
}

/// True iff `time` lies in `[break.start, break.end)` for any break
///
/// Only the start time is considered.
pub fn is_during_break(time: ClockTime, breaks: &[BreakPeriod]) -> bool {
    break_containing(time, breaks).is_some()
}

/// First configured break containing `time`
pub fn break_containing(time: ClockTime, breaks: &[BreakPeriod]) -> Option<&BreakPeriod> {
    breaks.iter().find(|b| b.contains(time))
}

/// First configured break overlapping `[time, time + duration)`
pub fn break_overlapping(
    time: ClockTime,
    duration_minutes: u32,
    breaks: &[BreakPeriod],
) -> Option<&BreakPeriod> {
    let start = time.minutes();
    let end = time.end_minutes(duration_minutes);
    breaks.iter().find(|b| b.overlaps(start, end))
}

/// Outcome of evaluating one candidate placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Nothing in the snapshot collides
    Free,
    /// Blocked by a break period
    DuringBreak { break_name: String },
    /// Overlaps appointments in the snapshot; multi-patient slots are still allowed
    Occupied { appointment_ids: Vec<AppointmentId> },
}

impl Placement {
    /// Whether a draft may be created here
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Placement::DuringBreak { .. })
    }
}

/// Applies the configured break policy and the occupancy check together
pub struct ConflictEvaluator<'a> {
    schedule: &'a ScheduleConfiguration,
}

impl<'a> ConflictEvaluator<'a> {
    pub fn new(schedule: &'a ScheduleConfiguration) -> Self {
        Self { schedule }
    }

    /// Break that blocks a placement under the configured policy
    pub fn blocking_break(&self, time: ClockTime, duration_minutes: u32) -> Option<&'a BreakPeriod> {
        match self.schedule.break_overlap_policy {
            BreakOverlapPolicy::StartOnly => break_containing(time, &self.schedule.breaks),
            BreakOverlapPolicy::FullInterval => {
                break_overlapping(time, duration_minutes, &self.schedule.breaks)
            }
        }
    }

    /// Classify a candidate placement; breaks take precedence over occupancy
    pub fn evaluate(
        &self,
        date: NaiveDate,
        time: ClockTime,
        duration_minutes: u32,
        store: &AvailabilityStore,
    ) -> Placement {
        if let Some(period) = self.blocking_break(time, duration_minutes) {
            return Placement::DuringBreak {
                break_name: period.name.clone(),
            };
        }

        let hits = occupying(date, time, duration_minutes, store.appointments_on(date));
        if hits.is_empty() {
            Placement::Free
        } else {
            Placement::Occupied {
                appointment_ids: hits.into_iter().map(|a| a.id.clone()).collect(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AppointmentStatus, VisitType};
    use test_case::test_case;

    fn t(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn apt(id: &str, time: &str, duration: u32, status: AppointmentStatus) -> ExistingAppointment {
        ExistingAppointment {
            id: AppointmentId::new(id).unwrap(),
            patient_id: None,
            patient_display_name: "Pat".to_string(),
            date: day(),
            time: t(time),
            duration_minutes: duration,
            visit_type: Some(VisitType::RegularVisit),
            status,
        }
    }

    // Existing appointment 10:00-10:30
    #[test_case("09:30", 30, false ; "ends exactly at start")]
    #[test_case("10:30", 15, false ; "starts exactly at end")]
    #[test_case("10:15", 15, true ; "contained")]
    #[test_case("09:45", 30, true ; "overlaps start")]
    #[test_case("10:20", 60, true ; "overlaps end")]
    #[test_case("09:00", 120, true ; "encloses")]
    #[test_case("11:00", 30, false ; "later")]
    fn test_is_occupied_interval(time: &str, duration: u32, expected: bool) {
        let existing = vec![apt("a1", "10:00", 30, AppointmentStatus::Scheduled)];
        assert_eq!(is_occupied(day(), t(time), duration, &existing), expected);
    }

    #[test]
    fn test_huge_existing_duration_occupies_rest_of_day() {
        let existing = vec![apt("a1", "10:00", u32::MAX, AppointmentStatus::Scheduled)];
        assert!(is_occupied(day(), t("10:15"), 15, &existing));
        assert!(is_occupied(day(), t("23:45"), 15, &existing));
        assert!(!is_occupied(day(), t("09:30"), 30, &existing));
    }

    #[test]
    fn test_cancelled_appointments_ignored() {
        let existing = vec![apt("a1", "10:00", 30, AppointmentStatus::Cancelled)];
        assert!(!is_occupied(day(), t("10:00"), 30, &existing));
    }

    #[test]
    fn test_other_dates_ignored() {
        let mut other = apt("a1", "10:00", 30, AppointmentStatus::Scheduled);
        other.date = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();
        assert!(!is_occupied(day(), t("10:00"), 30, &[other]));
    }

    #[test]
    fn test_completed_appointments_still_occupy() {
        let existing = vec![apt("a1", "10:00", 30, AppointmentStatus::Completed)];
        assert!(is_occupied(day(), t("10:10"), 15, &existing));
    }

    #[test_case("11:59", false ; "before")]
    #[test_case("12:00", true ; "at start")]
    #[test_case("12:30", true ; "inside")]
    #[test_case("13:00", false ; "at end")]
    fn test_is_during_break(time: &str, expected: bool) {
        let breaks = vec![BreakPeriod::new("Lunch", t("12:00"), t("13:00"))];
        assert_eq!(is_during_break(t(time), &breaks), expected);
    }

    #[test]
    fn test_start_only_policy_allows_running_into_break() {
        let schedule = ScheduleConfiguration::default();
        let evaluator = ConflictEvaluator::new(&schedule);
        assert!(evaluator.blocking_break(t("11:45"), 30).is_none());
        assert_eq!(
            evaluator.blocking_break(t("12:30"), 15).map(|b| b.name.as_str()),
            Some("Lunch")
        );
    }

    #[test]
    fn test_full_interval_policy_blocks_running_into_break() {
        let mut schedule = ScheduleConfiguration::default();
        schedule.set_break_overlap_policy(BreakOverlapPolicy::FullInterval);
        let evaluator = ConflictEvaluator::new(&schedule);
        assert!(evaluator.blocking_break(t("11:45"), 30).is_some());
        assert!(evaluator.blocking_break(t("11:30"), 30).is_none());
    }

    #[test]
    fn test_evaluate_prefers_break_over_occupancy() {
        let schedule = ScheduleConfiguration::default();
        let mut store = AvailabilityStore::new();
        store.insert(day(), vec![apt("a1", "12:00", 60, AppointmentStatus::Scheduled)]);
        let evaluator = ConflictEvaluator::new(&schedule);
        assert_eq!(
            evaluator.evaluate(day(), t("12:00"), 30, &store),
            Placement::DuringBreak {
                break_name: "Lunch".to_string()
            }
        );
    }

    #[test]
    fn test_evaluate_reports_occupying_ids() {
        let schedule = ScheduleConfiguration::default();
        let mut store = AvailabilityStore::new();
        store.insert(
            day(),
            vec![
                apt("a1", "10:00", 30, AppointmentStatus::Scheduled),
                apt("a2", "10:15", 30, AppointmentStatus::CheckedIn),
                apt("a3", "10:15", 30, AppointmentStatus::Cancelled),
            ],
        );
        let evaluator = ConflictEvaluator::new(&schedule);
        let placement = evaluator.evaluate(day(), t("10:15"), 15, &store);
        assert_eq!(
            placement,
            Placement::Occupied {
                appointment_ids: vec![
                    AppointmentId::new("a1").unwrap(),
                    AppointmentId::new("a2").unwrap()
                ]
            }
        );
        // Occupancy is advisory
        assert!(placement.is_allowed());
    }

    #[test]
    fn test_evaluate_free() {
        let schedule = ScheduleConfiguration::default();
        let store = AvailabilityStore::new();
        let evaluator = ConflictEvaluator::new(&schedule);
        assert_eq!(evaluator.evaluate(day(), t("08:00"), 30, &store), Placement::Free);
    }
}
