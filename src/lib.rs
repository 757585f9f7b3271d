// Slotwise - Clinic Appointment Scheduling Engine
// Copyright (c) 2025 Slotwise Contributors
// Licensed under the MIT License

//! # Slotwise - Clinic Appointment Scheduling
//!
//! Slotwise checks candidate appointment slots against breaks and existing
//! bookings and walks a multi-appointment booking wizard through to
//! submission against a clinic REST backend.
//!
//! ## Overview
//!
//! - **Conflict checking**: closed-open interval overlap against a snapshot of
//!   existing appointments, and break checks under a configurable policy
//! - **Draft set**: several drafts per `(date, time)` slot, each with its own
//!   patient, visit type, color tag and duration
//! - **Wizard**: dates, time slots, details, confirmation, with guarded forward
//!   moves and free backward moves
//! - **Rescheduling**: the same wizard driving a single existing appointment
//! - **Lifecycle**: status transitions and cancellation with an audit ledger
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Scheduling logic (schedule, conflict, drafts, workflow, lifecycle)
//! - [`adapters`] - Clinic REST API client plus in-memory and dry-run backends
//! - [`domain`] - Identifiers, time primitives, appointment vocabulary, errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use slotwise::adapters::clinic::HttpClinicApi;
//! use slotwise::config::load_config;
//! use slotwise::core::workflow::{SchedulingWorkflow, WizardStep};
//! use slotwise::domain::{PatientId, PatientSummary};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("slotwise.toml")?;
//!     let api = Arc::new(HttpClinicApi::new(&config.api)?);
//!     let mut wizard = SchedulingWorkflow::new(api, config.schedule.clone());
//!
//!     let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
//!     wizard.toggle_date(date)?;
//!     wizard.refresh_availability().await;
//!
//!     let draft = wizard.add_custom_time_slot(date, "09:00")?;
//!     wizard.assign_patient(&draft, PatientSummary {
//!         id: PatientId::new("P1")?,
//!         display_name: "Ana Silva".to_string(),
//!         record_number: None,
//!         phone: None,
//!     })?;
//!     wizard.go_to(WizardStep::Confirming)?;
//!
//!     let report = wizard.submit().await?;
//!     println!("created {} appointment(s)", report.created.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`]. Local rule violations are
//! [`domain::SchedulingError`] and never reach the server; remote failures are
//! [`domain::ApiError`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
