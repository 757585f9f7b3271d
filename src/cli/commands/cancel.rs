//! `cancel` command

use clap::Args;

use super::{build_api, exit_code_for, load_validated, EXIT_OK, EXIT_VALIDATION};
use crate::core::lifecycle::AppointmentLifecycle;
use crate::domain::AppointmentId;

#[derive(Args, Debug)]
pub struct CancelArgs {
    /// Appointment to cancel
    #[arg(long)]
    pub appointment_id: String,

    /// Reason recorded in the audit ledger
    #[arg(long, default_value = "")]
    pub reason: String,

    /// Validate the transition without cancelling
    #[arg(long)]
    pub dry_run: bool,
}

impl CancelArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_validated(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let id = match AppointmentId::new(self.appointment_id.as_str()) {
            Ok(id) => id,
            Err(e) => {
                eprintln!("{e}");
                return Ok(EXIT_VALIDATION);
            }
        };

        let api = match build_api(&config, self.dry_run) {
            Ok(api) => api,
            Err(e) => return Ok(exit_code_for(&e)),
        };

        let lifecycle = AppointmentLifecycle::new(api, config.api.ledger_enabled);
        match lifecycle.cancel(&id, &self.reason).await {
            Ok(()) => {
                println!("Appointment {id} cancelled");
                Ok(EXIT_OK)
            }
            Err(e) => {
                tracing::error!(appointment_id = %id, error = %e, "Cancellation failed");
                eprintln!("Cannot cancel appointment {id}: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}
