//! Status command implementation
//!
//! This module implements the `status` command, which lists the import sets
//! the next cycle would export.

use crate::cli::commands::load_checked_config;
use crate::cli::commands::run::setup_exit_code;
use crate::core::export::ExportPipeline;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the pending ids as a JSON array
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking pending import sets");

        let config = match load_checked_config(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let pipeline = match ExportPipeline::from_config(&config) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Failed to initialize staging repository: {e}");
                return Ok(setup_exit_code(&e));
            }
        };

        let pending = match pipeline.pending_import_sets().await {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list pending import sets");
                println!("❌ Failed to reach staging store");
                println!("   Error: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        if self.json {
            let ids: Vec<&str> = pending.iter().map(|id| id.as_str()).collect();
            println!("{}", serde_json::to_string(&ids)?);
            return Ok(0);
        }

        println!("📊 Export Status");
        println!(
            "  Backend: {}",
            pipeline.processor().repository().backend_name()
        );
        println!(
            "  Export directory: {}",
            pipeline.processor().writer().directory().display()
        );
        println!();

        if pending.is_empty() {
            println!("No import sets waiting for export.");
            return Ok(0);
        }

        println!("Pending import sets ({}):", pending.len());
        for id in &pending {
            println!("  {id}");
        }
        Ok(0)
    }
}
