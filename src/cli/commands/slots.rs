//! `slots` command: print the time-slot grid for one or more dates

use clap::Args;

use super::{build_api, exit_code_for, load_validated, EXIT_OK, EXIT_VALIDATION};
use crate::core::workflow::{SchedulingWorkflow, SlotView};
use crate::domain::{date_key, parse_date, AppointmentDuration};

#[derive(Args, Debug)]
pub struct SlotsArgs {
    /// Date to show (YYYY-MM-DD), repeatable
    #[arg(short, long = "date", required = true)]
    pub dates: Vec<String>,

    /// Candidate duration in minutes (15, 20, 30, 45, 60)
    #[arg(long)]
    pub duration: Option<u32>,
}

impl SlotsArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_validated(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let mut dates = Vec::with_capacity(self.dates.len());
        for raw in &self.dates {
            match parse_date(raw) {
                Ok(d) => dates.push(d),
                Err(e) => {
                    eprintln!("{e}");
                    return Ok(EXIT_VALIDATION);
                }
            }
        }

        let duration = match self.duration.map(AppointmentDuration::try_from).transpose() {
            Ok(d) => d.unwrap_or(config.schedule.default_duration),
            Err(e) => {
                eprintln!("{e}");
                return Ok(EXIT_VALIDATION);
            }
        };

        let api = match build_api(&config, false) {
            Ok(api) => api,
            Err(e) => return Ok(exit_code_for(&e)),
        };

        let mut workflow = SchedulingWorkflow::new(api, config.schedule.clone());
        workflow.set_selected_duration(duration);
        if let Err(e) = workflow.select_dates(&dates) {
            eprintln!("{e}");
            return Ok(exit_code_for(&e));
        }
        workflow.refresh_availability().await;

        for date in workflow.selected_dates() {
            let loaded = workflow.availability().is_loaded(date);
            println!(
                "{} ({}){}",
                date_key(date),
                duration,
                if loaded { "" } else { " - existing appointments unavailable" }
            );
            for view in workflow.slot_grid_for(date) {
                println!("  {}", describe(&view));
            }
            println!();
        }

        Ok(EXIT_OK)
    }
}

fn describe(view: &SlotView) -> String {
    if let Some(name) = &view.break_name {
        return format!("{}  [{}]", view.time, name);
    }
    if view.occupied_by.is_empty() {
        return format!("{}  free", view.time);
    }
    let who: Vec<String> = view
        .occupied_by
        .iter()
        .map(|a| format!("{} ({} min)", a.patient_display_name, a.duration_minutes))
        .collect();
    format!("{}  booked: {}", view.time, who.join(", "))
}
