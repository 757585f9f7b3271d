//! `reschedule` command: move one existing appointment through the wizard

use clap::Args;

use super::{
    build_api, exit_code_for, exit_code_for_report, load_validated, print_report,
    EXIT_VALIDATION,
};
use crate::core::drafts::DraftField;
use crate::core::workflow::{SchedulingWorkflow, WizardStep};
use crate::domain::{
    date_key, parse_date, AppointmentDuration, AppointmentId, ClockTime, ExistingAppointment,
    RescheduleContext, Result, SlotwiseError,
};

#[derive(Args, Debug)]
pub struct RescheduleArgs {
    /// Appointment to move
    #[arg(long)]
    pub appointment_id: String,

    /// New date (YYYY-MM-DD)
    #[arg(long)]
    pub date: String,

    /// New time (HH:MM)
    #[arg(long)]
    pub time: String,

    /// Reason recorded with the change
    #[arg(long, default_value = "")]
    pub reason: String,

    /// New duration in minutes; keeps the appointment's own duration otherwise
    #[arg(long)]
    pub duration: Option<u32>,

    /// Walk the workflow without updating the appointment
    #[arg(long)]
    pub dry_run: bool,
}

impl RescheduleArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_validated(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let request = match self.parse() {
            Ok(r) => r,
            Err(e) => {
                eprintln!("{e}");
                return Ok(EXIT_VALIDATION);
            }
        };

        let api = match build_api(&config, self.dry_run) {
            Ok(api) => api,
            Err(e) => return Ok(exit_code_for(&e)),
        };

        let existing = match api.appointment(&request.appointment_id).await {
            Ok(apt) => apt,
            Err(e) => {
                let e = SlotwiseError::from(e);
                eprintln!("Cannot load appointment {}: {e}", request.appointment_id);
                return Ok(exit_code_for(&e));
            }
        };
        let Some(patient_id) = existing.patient_id.clone() else {
            eprintln!("Appointment {} has no patient", existing.id);
            return Ok(EXIT_VALIDATION);
        };
        let duration = match resolve_duration(request.duration, &existing) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("{e}");
                return Ok(EXIT_VALIDATION);
            }
        };

        let context = RescheduleContext {
            appointment_id: existing.id.clone(),
            patient_id,
            patient_display_name: existing.patient_display_name.clone(),
            original_date: existing.date,
            original_time: existing.time,
            reason: self.reason.clone(),
        };

        let mut workflow = SchedulingWorkflow::for_reschedule(api, config.schedule.clone(), context)
            .with_ledger(config.api.ledger_enabled);

        let outcome = run(&mut workflow, &request, &existing, duration).await;

        match outcome {
            Ok(code) => Ok(code),
            Err(e) => {
                tracing::error!(error = %e, "Reschedule failed");
                eprintln!("Reschedule failed: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }

    fn parse(&self) -> Result<ParsedReschedule> {
        Ok(ParsedReschedule {
            appointment_id: AppointmentId::new(self.appointment_id.as_str())
                .map_err(SlotwiseError::Validation)?,
            date: parse_date(&self.date)?,
            time: ClockTime::parse_manual(&self.time)?,
            duration: self.duration.map(AppointmentDuration::try_from).transpose()?,
        })
    }
}

/// Requested duration, else the appointment's own one when it is an allowed value
fn resolve_duration(
    requested: Option<AppointmentDuration>,
    existing: &ExistingAppointment,
) -> Result<AppointmentDuration> {
    if let Some(duration) = requested {
        return Ok(duration);
    }
    AppointmentDuration::try_from(existing.duration_minutes).map_err(|_| {
        SlotwiseError::Validation(format!(
            "appointment {} lasts {} minutes, which is not an allowed duration; pass --duration",
            existing.id, existing.duration_minutes
        ))
    })
}

async fn run(
    workflow: &mut SchedulingWorkflow,
    request: &ParsedReschedule,
    existing: &ExistingAppointment,
    duration: AppointmentDuration,
) -> Result<i32> {
    workflow.set_selected_duration(duration);
    workflow.select_dates(&[request.date])?;
    workflow.refresh_availability().await;

    let draft_id = workflow.select_time_slot(request.date, request.time)?;
    if let Some(visit_type) = existing.visit_type {
        workflow.update_draft(&draft_id, DraftField::VisitType(visit_type))?;
    }
    workflow.update_draft(&draft_id, DraftField::Duration(duration))?;
    workflow.go_to(WizardStep::Confirming)?;

    println!(
        "Rescheduling {} ({}) from {} {} to {} {}",
        existing.id,
        existing.patient_display_name,
        date_key(existing.date),
        existing.time,
        date_key(request.date),
        request.time
    );

    let report = workflow.submit().await?;
    print_report(&report);
    Ok(exit_code_for_report(&report))
}

struct ParsedReschedule {
    appointment_id: AppointmentId,
    date: chrono::NaiveDate,
    time: ClockTime,
    duration: Option<AppointmentDuration>,
}
