//! `book` command: drive the scheduling wizard from the command line
//!
//! Drafts come either from repeated `--entry DATE,TIME,PATIENT[,VISIT_TYPE[,DURATION]]`
//! arguments or from a versioned JSON input document.

use clap::Args;
use std::path::PathBuf;

use super::{
    build_api, exit_code_for, exit_code_for_report, load_validated, print_report,
    EXIT_VALIDATION,
};
use crate::core::conflict::Placement;
use crate::core::legacy::{AppointmentInput, SlotEntry};
use crate::core::workflow::{SchedulingWorkflow, WizardStep};
use crate::domain::{parse_date, AppointmentDuration, ClockTime, PatientId, SlotwiseError, VisitType};

#[derive(Args, Debug)]
pub struct BookArgs {
    /// Appointment as DATE,TIME,PATIENT[,VISIT_TYPE[,DURATION]], repeatable
    #[arg(short, long = "entry", required_unless_present = "input", conflicts_with = "input")]
    pub entries: Vec<String>,

    /// JSON input document with a "version" of "v1" or "v2"
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Walk the workflow without creating appointments
    #[arg(long)]
    pub dry_run: bool,
}

impl BookArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_validated(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let input = match self.read_input() {
            Ok(input) => input,
            Err(e) => {
                eprintln!("Invalid booking input: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let api = match build_api(&config, self.dry_run) {
            Ok(api) => api,
            Err(e) => return Ok(exit_code_for(&e)),
        };
        let mut workflow = SchedulingWorkflow::new(api, config.schedule.clone())
            .with_ledger(config.api.ledger_enabled);

        match run(&mut workflow, input).await {
            Ok(code) => Ok(code),
            Err(e) => {
                tracing::error!(session_id = %workflow.session_id(), error = %e, "Booking failed");
                eprintln!("Booking failed: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }

    fn read_input(&self) -> crate::domain::Result<AppointmentInput> {
        if let Some(path) = &self.input {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                SlotwiseError::Validation(format!("Cannot read {}: {}", path.display(), e))
            })?;
            return Ok(serde_json::from_str(&raw)
                .map_err(|e| SlotwiseError::Validation(format!("{}: {}", path.display(), e)))?);
        }

        let drafts = self
            .entries
            .iter()
            .map(|raw| parse_entry(raw))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(AppointmentInput::Drafts { drafts })
    }
}

async fn run(workflow: &mut SchedulingWorkflow, input: AppointmentInput) -> crate::domain::Result<i32> {
    let count = workflow.load_input(input)?;
    if count == 0 {
        eprintln!("Nothing to book");
        return Ok(EXIT_VALIDATION);
    }

    workflow.refresh_availability().await;

    let mut warnings = Vec::new();
    for draft in workflow.drafts().drafts() {
        if let Placement::Occupied { appointment_ids } = workflow.placement(draft.date, draft.time)
        {
            warnings.push(format!(
                "{} overlaps {} existing appointment(s)",
                draft.slot_key(),
                appointment_ids.len()
            ));
        }
    }
    for warning in &warnings {
        println!("Note: {warning}");
    }

    workflow.go_to(WizardStep::Confirming)?;

    println!("Booking {count} appointment(s):");
    for (date, times) in workflow.drafts().to_selected_time_slots_map() {
        println!("  {}: {}", date, times.join(", "));
    }

    let report = workflow.submit().await?;
    print_report(&report);
    Ok(exit_code_for_report(&report))
}

/// Parse `DATE,TIME,PATIENT[,VISIT_TYPE[,DURATION]]`
pub fn parse_entry(raw: &str) -> crate::domain::Result<SlotEntry> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() < 3 || parts.len() > 5 {
        return Err(SlotwiseError::Validation(format!(
            "'{raw}' must look like DATE,TIME,PATIENT[,VISIT_TYPE[,DURATION]]"
        )));
    }

    let date = parse_date(parts[0])?;
    let time = ClockTime::parse_manual(parts[1])?;
    let patient_id = PatientId::new(parts[2]).map_err(SlotwiseError::Validation)?;
    let visit_type = parts
        .get(3)
        .map(|v| v.parse::<VisitType>())
        .transpose()?;
    let duration_minutes = match parts.get(4) {
        Some(d) => {
            let minutes = d.parse::<u32>().map_err(|_| {
                SlotwiseError::Validation(format!("duration '{d}' is not a number"))
            })?;
            Some(AppointmentDuration::try_from(minutes)?)
        }
        None => None,
    };

    Ok(SlotEntry {
        date,
        time,
        duration_minutes,
        patient_id: Some(patient_id),
        patient_display_name: None,
        visit_type,
        color_tag: None,
        notes: None,
        chief_complaint: None,
    })
}
