//! Once command implementation
//!
//! This module implements the `once` command: a single export cycle, with
//! the cycle summary printed as text or JSON.

use crate::cli::commands::load_checked_config;
use crate::cli::commands::run::setup_exit_code;
use crate::core::export::{CycleStatus, CycleSummary, ExportPipeline, ImportSetReport};
use clap::Args;

/// Arguments for the once command
#[derive(Args, Debug)]
pub struct OnceArgs {
    /// Print the cycle summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Dry run mode - render import sets without writing files or flags
    #[arg(long)]
    pub dry_run: bool,
}

impl OnceArgs {
    /// Execute the once command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut config = match load_checked_config(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        if self.dry_run {
            config.export.dry_run = true;
        }

        let pipeline = match ExportPipeline::from_config(&config) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create export pipeline");
                eprintln!("Failed to initialize export: {e}");
                return Ok(setup_exit_code(&e));
            }
        };

        let summary = pipeline.run_cycle().await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary);
        }

        Ok(exit_code(&summary))
    }
}

/// Exit code for a finished cycle
pub(crate) fn exit_code(summary: &CycleSummary) -> i32 {
    match summary.status {
        CycleStatus::Failed => 4,
        CycleStatus::Overlapped => 1,
        CycleStatus::Completed if summary.failed > 0 => 1,
        CycleStatus::Completed => 0,
    }
}

fn print_summary(summary: &CycleSummary) {
    if let Some(ref error) = summary.error {
        println!("❌ Export cycle failed: {error}");
        return;
    }

    if summary.dry_run {
        println!("🔍 DRY RUN - no files written, no headers flagged");
    }

    for report in &summary.import_sets {
        match report {
            ImportSetReport::Exported {
                import_set,
                header_file,
                line_file,
                line_count,
            } => println!(
                "  ✅ {import_set}: {} + {} ({line_count} lines)",
                header_file.display(),
                line_file.display()
            ),
            ImportSetReport::DryRun {
                import_set,
                line_count,
            } => println!("  🔍 {import_set}: would export {line_count} lines"),
            ImportSetReport::Skipped { import_set, reason } => {
                println!("  ⏭️  {import_set}: skipped ({reason})")
            }
            ImportSetReport::Failed {
                import_set,
                stage,
                error,
                reconcile,
            } => {
                println!("  ❌ {import_set}: failed during {stage}: {error}");
                if *reconcile {
                    println!("     files were written; header not flagged");
                }
            }
        }
    }

    println!();
    println!(
        "Pending: {}  Exported: {}  Skipped: {}  Failed: {}  ({} ms)",
        summary.pending,
        summary.exported,
        summary.skipped,
        summary.failed,
        summary.duration.as_millis()
    );
}
