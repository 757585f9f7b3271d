// Slotwise - Clinic Appointment Scheduling Engine
// Copyright (c) 2025 Slotwise Contributors
// Licensed under the MIT License

use clap::Parser;
use slotwise::cli::{Cli, Commands};
use slotwise::config::LoggingConfig;
use slotwise::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Console only, no file logging for CLI runs
    let log_level = cli.log_level.as_deref().unwrap_or("info");
    let logging_config = LoggingConfig {
        local_enabled: false,
        ..LoggingConfig::default()
    };
    let guard = match init_logging(log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Slotwise starting");

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    drop(guard);
    process::exit(exit_code);
}

async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Slots(args) => args.execute(&cli.config).await,
        Commands::Book(args) => args.execute(&cli.config).await,
        Commands::Reschedule(args) => args.execute(&cli.config).await,
        Commands::Cancel(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
