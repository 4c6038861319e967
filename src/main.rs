// Record Importer - Legacy deposit migration tool
// Copyright (c) 2025 Record Importer Contributors
// Licensed under the MIT License

use record_importer::cli::{Cli, Commands};
use record_importer::config::{load_config, LoggingConfig};
use record_importer::logging::init_logging;
use clap::Parser;
use std::path::PathBuf;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging follows the configuration when it loads; commands that
    // fail on a bad configuration report that themselves
    let (level, logging_config, log_dir) = match load_config(&cli.config) {
        Ok(config) => (
            cli.log_level
                .clone()
                .unwrap_or_else(|| config.application.log_level.clone()),
            config.logging.clone(),
            config.log_directory(),
        ),
        Err(_) => (
            cli.log_level.clone().unwrap_or_else(|| "info".to_string()),
            LoggingConfig {
                local_enabled: false,
                ..LoggingConfig::default()
            },
            PathBuf::from("logs"),
        ),
    };

    let guard = match init_logging(&level, &logging_config, &log_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(2);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Record Importer - Legacy deposit migration tool"
    );

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5 // Fatal error exit code
        }
    };

    // process::exit skips destructors
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Load(args) => args.execute(&cli.config).await,
        Commands::Read(args) => args.execute(&cli.config).await,
        Commands::CreateUser(args) => args.execute(&cli.config).await,
        Commands::Delete(args) => args.execute(&cli.config).await,
        Commands::Count(args) => args.execute(&cli.config).await,
        Commands::Status(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
