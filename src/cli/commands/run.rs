//! Run command implementation
//!
//! This module implements the `run` command: export cycles on the configured
//! interval until SIGINT or SIGTERM, then a graceful stop that lets the
//! running cycle finish.

use crate::cli::commands::load_checked_config;
use crate::core::export::ExportPipeline;
use crate::core::scheduler::ExportScheduler;
use crate::domain::OrderExportError;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Dry run mode - render import sets without writing files or flags
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        mut shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match load_checked_config(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.export.dry_run = true;
        }

        let pipeline = match ExportPipeline::from_config(&config) {
            Ok(p) => Arc::new(p),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create export pipeline");
                eprintln!("Failed to initialize export: {e}");
                return Ok(setup_exit_code(&e));
            }
        };

        let scheduler = ExportScheduler::from_config(pipeline, &config);

        if config.is_dry_run() {
            println!("🔍 DRY RUN MODE - No files will be written and no headers flagged");
        }
        println!(
            "🚀 Exporting to {} every {} minute(s). Press Ctrl+C to stop.",
            config.export.directory.display(),
            scheduler.interval().as_secs() / 60
        );

        scheduler.start();

        // Wait for the signal handler; a dropped sender also means shutdown
        while !*shutdown_signal.borrow() {
            if shutdown_signal.changed().await.is_err() {
                break;
            }
        }

        let timeout = config.export.shutdown_timeout();
        tracing::info!(
            timeout_secs = timeout.as_secs(),
            "Shutdown requested, waiting for the running cycle"
        );

        if scheduler.shutdown(timeout).await {
            println!("✅ Export scheduler stopped");
            Ok(0)
        } else {
            eprintln!("⚠️  Running export cycle did not finish within {}s", timeout.as_secs());
            Ok(1)
        }
    }
}

/// Exit code for a pipeline that could not be built
pub(crate) fn setup_exit_code(error: &OrderExportError) -> i32 {
    match error {
        OrderExportError::Configuration(_) => 2,
        _ => 4,
    }
}
