//! CLI interface and argument parsing

pub mod commands;

use clap::{Parser, Subcommand};

/// Slotwise - clinic appointment scheduling
#[derive(Parser, Debug)]
#[command(name = "slotwise")]
#[command(version, about, long_about = None)]
#[command(author = "Slotwise Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "slotwise.toml", env = "SLOTWISE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SLOTWISE_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the time-slot grid with breaks and existing appointments
    Slots(commands::slots::SlotsArgs),

    /// Book one or more appointments
    Book(commands::book::BookArgs),

    /// Move an existing appointment to a new date and time
    Reschedule(commands::reschedule::RescheduleArgs),

    /// Cancel an existing appointment
    Cancel(commands::cancel::CancelArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
