//! Snapshot of existing appointments for the selected dates
//!
//! Loading is split into [`AvailabilityStore::begin_load`], which hands out a
//! [`LoadTicket`] stamped with the current epoch, and
//! [`AvailabilityStore::complete_load`], which applies results only if the
//! epoch is unchanged. Changing the date selection bumps the epoch, so a slow
//! response for an abandoned selection is dropped.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::adapters::clinic::AppointmentApi;
use crate::domain::{date_key, ApiError, ExistingAppointment};

/// Dates to load, stamped with the epoch they were requested under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub epoch: u64,
    pub dates: Vec<NaiveDate>,
}

/// Result of loading one date
#[derive(Debug)]
pub struct DateLoad {
    pub date: NaiveDate,
    pub outcome: Result<Vec<ExistingAppointment>, ApiError>,
}

/// Existing appointments keyed by date, cancelled ones already filtered out
#[derive(Debug, Default)]
pub struct AvailabilityStore {
    by_date: HashMap<NaiveDate, Vec<ExistingAppointment>>,
    epoch: u64,
}

impl AvailabilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Invalidate every outstanding ticket and forget the snapshot
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        self.by_date.clear();
    }

    /// Ticket for loading `dates` under the current epoch
    pub fn begin_load(&self, dates: &[NaiveDate]) -> LoadTicket {
        LoadTicket {
            epoch: self.epoch,
            dates: dates.to_vec(),
        }
    }

    /// Apply loaded results unless the ticket is stale
    ///
    /// Returns `false` when the results were discarded. A failed date keeps
    /// its previous snapshot, if any.
    pub fn complete_load(&mut self, ticket: &LoadTicket, results: Vec<DateLoad>) -> bool {
        if ticket.epoch != self.epoch {
            tracing::debug!(
                ticket_epoch = ticket.epoch,
                current_epoch = self.epoch,
                "Discarding stale availability response"
            );
            return false;
        }

        for load in results {
            match load.outcome {
                Ok(appointments) => self.insert(load.date, appointments),
                Err(e) => {
                    tracing::warn!(
                        date = %date_key(load.date),
                        error = %e,
                        "Failed to load existing appointments"
                    );
                }
            }
        }
        true
    }

    /// Replace the snapshot for one date
    pub fn insert(&mut self, date: NaiveDate, appointments: Vec<ExistingAppointment>) {
        let kept: Vec<ExistingAppointment> = appointments
            .into_iter()
            .filter(|apt| !apt.is_cancelled())
            .collect();
        self.by_date.insert(date, kept);
    }

    /// Non-cancelled appointments on `date`, empty if never loaded
    pub fn appointments_on(&self, date: NaiveDate) -> &[ExistingAppointment] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_loaded(&self, date: NaiveDate) -> bool {
        self.by_date.contains_key(&date)
    }
}

/// Fetch every date on the ticket, one request at a time
pub async fn fetch_ticket(api: &dyn AppointmentApi, ticket: &LoadTicket) -> Vec<DateLoad> {
    let mut results = Vec::with_capacity(ticket.dates.len());
    for date in &ticket.dates {
        let outcome = api.appointments_on(*date).await;
        results.push(DateLoad {
            date: *date,
            outcome,
        });
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AppointmentId, AppointmentStatus, ClockTime};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn apt(id: &str, status: AppointmentStatus) -> ExistingAppointment {
        ExistingAppointment {
            id: AppointmentId::new(id).unwrap(),
            patient_id: None,
            patient_display_name: "Pat".to_string(),
            date: day(10),
            time: ClockTime::from_hm(10, 0).unwrap(),
            duration_minutes: 30,
            visit_type: None,
            status,
        }
    }

    #[test]
    fn test_insert_filters_cancelled() {
        let mut store = AvailabilityStore::new();
        store.insert(
            day(10),
            vec![
                apt("a1", AppointmentStatus::Scheduled),
                apt("a2", AppointmentStatus::Cancelled),
            ],
        );
        assert_eq!(store.appointments_on(day(10)).len(), 1);
        assert!(store.appointments_on(day(11)).is_empty());
        assert!(!store.is_loaded(day(11)));
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut store = AvailabilityStore::new();
        let ticket = store.begin_load(&[day(10)]);
        store.invalidate();

        let applied = store.complete_load(
            &ticket,
            vec![DateLoad {
                date: day(10),
                outcome: Ok(vec![apt("a1", AppointmentStatus::Scheduled)]),
            }],
        );
        assert!(!applied);
        assert!(!store.is_loaded(day(10)));
    }

    #[test]
    fn test_current_ticket_is_applied() {
        let mut store = AvailabilityStore::new();
        let ticket = store.begin_load(&[day(10), day(11)]);
        let applied = store.complete_load(
            &ticket,
            vec![
                DateLoad {
                    date: day(10),
                    outcome: Ok(vec![apt("a1", AppointmentStatus::Scheduled)]),
                },
                DateLoad {
                    date: day(11),
                    outcome: Err(ApiError::Timeout("slow".to_string())),
                },
            ],
        );
        assert!(applied);
        assert!(store.is_loaded(day(10)));
        assert!(!store.is_loaded(day(11)));
    }

    #[test]
    fn test_invalidate_clears_snapshot() {
        let mut store = AvailabilityStore::new();
        store.insert(day(10), vec![apt("a1", AppointmentStatus::Scheduled)]);
        store.invalidate();
        assert_eq!(store.epoch(), 1);
        assert!(store.appointments_on(day(10)).is_empty());
    }
}
