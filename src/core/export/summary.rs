//! Cycle summary and reporting
//!
//! This module defines structures for tracking and reporting the result of
//! one export cycle.

use crate::core::export::processor::{ImportSetOutcome, SkipReason};
use crate::domain::{ExportStage, ImportSetError, ImportSetId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// How a cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// Every pending import set was attempted
    Completed,
    /// The staging store could not be reached or listed
    Failed,
    /// Another cycle was still running
    Overlapped,
}

/// What happened to one import set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ImportSetReport {
    /// Files written and header flagged
    Exported {
        /// Import set id
        import_set: String,
        /// Header file
        header_file: PathBuf,
        /// Line file
        line_file: PathBuf,
        /// Records in the line file
        line_count: usize,
    },
    /// Rendered only
    DryRun {
        /// Import set id
        import_set: String,
        /// Rendered lines
        line_count: usize,
    },
    /// Left pending without changes
    Skipped {
        /// Import set id
        import_set: String,
        /// Why
        reason: SkipReason,
    },
    /// Failed; stays pending
    Failed {
        /// Import set id
        import_set: String,
        /// Stage that failed
        stage: ExportStage,
        /// Error message
        error: String,
        /// Files are on disk but the header was not flagged
        reconcile: bool,
    },
}

/// Summary of one export cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    /// Cycle identifier used in logs
    pub cycle_id: String,

    /// Cycle start time
    pub started_at: DateTime<Utc>,

    /// Wall time of the cycle
    #[serde(rename = "duration_ms", serialize_with = "serialize_duration_ms")]
    pub duration: Duration,

    /// How the cycle ended
    pub status: CycleStatus,

    /// Whether files and flags were left untouched
    pub dry_run: bool,

    /// Number of pending import sets listed
    pub pending: usize,

    /// Number exported
    pub exported: usize,

    /// Number skipped as not yet exportable
    pub skipped: usize,

    /// Number failed
    pub failed: usize,

    /// Cycle-level error, if the cycle failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Per import set results in processing order
    pub import_sets: Vec<ImportSetReport>,
}

fn serialize_duration_ms<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

impl CycleSummary {
    /// Create a new empty summary
    pub fn new(cycle_id: impl Into<String>, dry_run: bool) -> Self {
        Self {
            cycle_id: cycle_id.into(),
            started_at: Utc::now(),
            duration: Duration::from_secs(0),
            status: CycleStatus::Completed,
            dry_run,
            pending: 0,
            exported: 0,
            skipped: 0,
            failed: 0,
            error: None,
            import_sets: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Mark the cycle as failed before any import set was processed
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = CycleStatus::Failed;
        self.error = Some(error.into());
    }

    /// Mark the cycle as skipped because another one was running
    pub fn overlapped(mut self) -> Self {
        self.status = CycleStatus::Overlapped;
        self
    }

    /// Record a processed import set
    pub fn record_outcome(&mut self, id: &ImportSetId, outcome: &ImportSetOutcome) {
        let import_set = id.to_string();
        let report = match outcome {
            ImportSetOutcome::Exported { files, line_count } => {
                self.exported += 1;
                ImportSetReport::Exported {
                    import_set,
                    header_file: files.header_path.clone(),
                    line_file: files.line_path.clone(),
                    line_count: *line_count,
                }
            }
            ImportSetOutcome::DryRun { line_count } => {
                self.exported += 1;
                ImportSetReport::DryRun {
                    import_set,
                    line_count: *line_count,
                }
            }
            ImportSetOutcome::Skipped(reason) => {
                self.skipped += 1;
                ImportSetReport::Skipped {
                    import_set,
                    reason: *reason,
                }
            }
        };
        self.import_sets.push(report);
    }

    /// Record a failed import set
    pub fn record_failure(&mut self, error: &ImportSetError) {
        self.failed += 1;
        self.import_sets.push(ImportSetReport::Failed {
            import_set: error.import_set.clone(),
            stage: error.stage,
            error: error.source.to_string(),
            reconcile: error.is_post_write(),
        });
    }

    /// Import sets whose files were written but whose header was not flagged
    pub fn needs_reconcile(&self) -> Vec<&str> {
        self.import_sets
            .iter()
            .filter_map(|r| match r {
                ImportSetReport::Failed {
                    import_set,
                    reconcile: true,
                    ..
                } => Some(import_set.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Check if the cycle was successful (reached the store, no failures)
    pub fn is_successful(&self) -> bool {
        self.status != CycleStatus::Failed && self.failed == 0
    }

    /// Get success rate as a percentage of attempted import sets
    pub fn success_rate(&self) -> f64 {
        let attempted = self.exported + self.failed;
        if attempted == 0 {
            return 100.0;
        }
        (self.exported as f64 / attempted as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        match self.status {
            CycleStatus::Failed => {
                tracing::error!(
                    cycle_id = %self.cycle_id,
                    error = self.error.as_deref().unwrap_or("unknown"),
                    duration_ms = self.duration.as_millis() as u64,
                    "Export cycle failed; retrying on the next tick"
                );
                return;
            }
            CycleStatus::Overlapped => {
                tracing::warn!(
                    cycle_id = %self.cycle_id,
                    "Export cycle skipped: previous cycle still running"
                );
                return;
            }
            CycleStatus::Completed => {}
        }

        crate::log_cycle_complete!(
            self.cycle_id,
            self.pending,
            self.exported,
            self.skipped,
            self.failed,
            self.duration.as_millis() as u64
        );

        if self.failed > 0 {
            tracing::warn!(
                cycle_id = %self.cycle_id,
                failed = self.failed,
                success_rate = format!("{:.2}%", self.success_rate()),
                "Export cycle completed with failures"
            );
        }

        let reconcile = self.needs_reconcile();
        if !reconcile.is_empty() {
            tracing::error!(
                cycle_id = %self.cycle_id,
                import_sets = ?reconcile,
                reconcile = true,
                "Export files written but headers not flagged"
            );
        }
    }
}
