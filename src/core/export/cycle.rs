//! Export cycle
//!
//! One cycle checks the staging store, lists the pending import sets and
//! exports them one at a time in listing order. Failures of a single import
//! set are recorded and the cycle moves on; a store that cannot be reached or
//! listed fails the whole cycle, which the next tick retries.

use crate::adapters::database::create_repository;
use crate::config::OrderExportConfig;
use crate::core::export::processor::ExportProcessor;
use crate::core::export::summary::CycleSummary;
use crate::core::export::writer::ExportFileWriter;
use crate::domain::{ImportSetId, Result};
use std::time::Instant;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Runs export cycles, at most one at a time
pub struct ExportPipeline {
    processor: ExportProcessor,
    cycle_lock: Mutex<()>,
}

impl ExportPipeline {
    /// Create a pipeline around a processor
    pub fn new(processor: ExportProcessor) -> Self {
        Self {
            processor,
            cycle_lock: Mutex::new(()),
        }
    }

    /// Build the repository, layouts and writer from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the staging repository cannot be created.
    pub fn from_config(config: &OrderExportConfig) -> Result<Self> {
        let repository = create_repository(config)?;
        let processor = ExportProcessor::new(
            repository,
            config.layout_set(),
            ExportFileWriter::new(config.export.writer_options()),
            config.is_dry_run(),
        );
        Ok(Self::new(processor))
    }

    /// The processor used for each import set
    pub fn processor(&self) -> &ExportProcessor {
        &self.processor
    }

    /// Whether a cycle body is executing right now
    pub fn is_cycle_running(&self) -> bool {
        self.cycle_lock.try_lock().is_err()
    }

    /// Pending import sets in export order, without exporting them
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or listed.
    pub async fn pending_import_sets(&self) -> Result<Vec<ImportSetId>> {
        let repository = self.processor.repository();
        repository.test_connection().await?;
        repository.list_pending_import_sets().await
    }

    /// Run one export cycle
    ///
    /// Never fails: cycle-level errors are recorded in the returned summary.
    /// If another cycle holds the lock this returns immediately with an
    /// overlapped summary.
    pub async fn run_cycle(&self) -> CycleSummary {
        let cycle_id = Uuid::new_v4().to_string();
        let dry_run = self.processor.is_dry_run();

        let Ok(_guard) = self.cycle_lock.try_lock() else {
            let summary = CycleSummary::new(cycle_id, dry_run).overlapped();
            summary.log_summary();
            return summary;
        };

        let start = Instant::now();
        let mut summary = CycleSummary::new(cycle_id.as_str(), dry_run);

        let pending = match self.pending_import_sets().await {
            Ok(pending) => pending,
            Err(e) => {
                summary.fail(e.to_string());
                let summary = summary.with_duration(start.elapsed());
                summary.log_summary();
                return summary;
            }
        };

        summary.pending = pending.len();
        crate::log_cycle_start!(cycle_id, pending.len());

        for id in &pending {
            match self.processor.process(id).await {
                Ok(outcome) => summary.record_outcome(id, &outcome),
                Err(e) => {
                    crate::log_import_set_failure!(e);
                    summary.record_failure(&e);
                }
            }
        }

        let summary = summary.with_duration(start.elapsed());
        summary.log_summary();
        summary
    }
}
