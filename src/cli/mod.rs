//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the importer using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Record Importer - Legacy deposit migration tool
#[derive(Parser, Debug)]
#[command(name = "record-importer")]
#[command(version, about, long_about = None)]
#[command(author = "Record Importer Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "importer.toml", env = "RECORD_IMPORTER_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load serialized records into the target store
    Load(commands::load::LoadArgs),

    /// Print serialized (or raw) records
    Read(commands::read::ReadArgs),

    /// Find or create a user and optionally assign community ownership
    #[command(name = "create_user", alias = "create-user")]
    CreateUser(commands::create_user::CreateUserArgs),

    /// Delete records from the target store
    Delete(commands::delete::DeleteArgs),

    /// Count the records in the serialized dataset
    Count(commands::count::CountArgs),

    /// Show the outcome ledger
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
