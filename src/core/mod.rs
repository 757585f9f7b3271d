//! Core scheduling logic for Slotwise.
//!
//! # Modules
//!
//! - [`schedule`] - Operating hours, breaks, placement policy and the slot grid
//! - [`conflict`] - Occupancy and break checks for candidate placements
//! - [`availability`] - Snapshot of existing appointments with stale-load protection
//! - [`drafts`] - The multi-appointment draft set
//! - [`legacy`] - Versioned input documents normalized into drafts
//! - [`workflow`] - The scheduling wizard and submission
//! - [`lifecycle`] - Status changes and cancellation of existing appointments
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use slotwise::adapters::clinic::InMemoryClinicApi;
//! use slotwise::core::schedule::ScheduleConfiguration;
//! use slotwise::core::workflow::SchedulingWorkflow;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(InMemoryClinicApi::new());
//! let mut wizard = SchedulingWorkflow::new(api, ScheduleConfiguration::default());
//!
//! let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
//! wizard.toggle_date(date)?;
//! wizard.refresh_availability().await;
//! let draft = wizard.add_custom_time_slot(date, "09:00")?;
//! println!("placed {draft}");
//! # Ok(())
//! # }
//! ```

pub mod availability;
pub mod conflict;
pub mod drafts;
pub mod legacy;
pub mod lifecycle;
pub mod schedule;
pub mod workflow;
