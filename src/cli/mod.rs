//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the exporter using clap.
//!
//! Commands return an exit code: 0 success, 1 some import sets failed,
//! 2 configuration error, 4 staging store unreachable, 5 fatal error.

pub mod commands;

use clap::{Parser, Subcommand};

/// Order Export - Scheduled ERP order export
#[derive(Parser, Debug)]
#[command(name = "order-export")]
#[command(version, about, long_about = None)]
#[command(author = "Order Export Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "order-export.toml",
        env = "ORDER_EXPORT_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ORDER_EXPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run export cycles on the configured interval until interrupted
    Run(commands::run::RunArgs),

    /// Run a single export cycle and exit
    Once(commands::once::OnceArgs),

    /// List import sets waiting for export
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
