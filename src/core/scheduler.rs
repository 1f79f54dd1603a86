//! Recurring export cycles
//!
//! [`ExportScheduler`] runs one cycle as soon as it starts and then one per
//! interval until stopped. Stopping only prevents future cycles; a cycle that
//! is already running finishes normally. The timer is a plain tokio task, so
//! it never keeps the process alive once the runtime shuts down.

use crate::config::{OrderExportConfig, MAX_INTERVAL_MINUTES};
use crate::core::export::ExportPipeline;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

const MAX_INTERVAL: Duration = Duration::from_secs(MAX_INTERVAL_MINUTES as u64 * 60);

#[derive(Default)]
struct SchedulerState {
    stop_tx: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

/// Owns the timer that drives export cycles
pub struct ExportScheduler {
    pipeline: Arc<ExportPipeline>,
    interval: Duration,
    state: Mutex<SchedulerState>,
}

impl std::fmt::Debug for ExportScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportScheduler")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

impl ExportScheduler {
    /// Create a stopped scheduler
    ///
    /// The interval is kept between one millisecond and one week.
    pub fn new(pipeline: Arc<ExportPipeline>, interval: Duration) -> Self {
        Self {
            pipeline,
            interval: interval.clamp(Duration::from_millis(1), MAX_INTERVAL),
            state: Mutex::new(SchedulerState::default()),
        }
    }

    /// Create a stopped scheduler using the configured interval
    pub fn from_config(pipeline: Arc<ExportPipeline>, config: &OrderExportConfig) -> Self {
        Self::new(pipeline, config.export.interval())
    }

    /// Time between cycle starts
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The pipeline the scheduler drives
    pub fn pipeline(&self) -> &Arc<ExportPipeline> {
        &self.pipeline
    }

    fn state(&self) -> MutexGuard<'_, SchedulerState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Whether the timer is armed
    pub fn is_running(&self) -> bool {
        self.state().stop_tx.is_some()
    }

    /// Start the timer and run the first cycle right away
    ///
    /// Must be called from within a tokio runtime. Returns `false` without
    /// doing anything if the scheduler is already running.
    pub fn start(&self) -> bool {
        let mut state = self.state();
        if state.stop_tx.is_some() {
            tracing::debug!("Export scheduler already running");
            return false;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let pipeline = self.pipeline.clone();
        let period = self.interval;

        tracing::info!(
            interval_secs = period.as_secs(),
            "Starting export scheduler"
        );

        let handle = tokio::spawn(run_loop(pipeline, period, stop_rx));

        // A previous loop may still be finishing its last cycle; the cycle
        // lock keeps the two from overlapping.
        if let Some(previous) = state.handle.replace(handle) {
            if !previous.is_finished() {
                tracing::debug!("Previous scheduler loop still draining");
            }
        }
        state.stop_tx = Some(stop_tx);
        true
    }

    /// Cancel future cycles
    ///
    /// An in-flight cycle is not interrupted. Returns `false` if the
    /// scheduler was not running.
    pub fn stop(&self) -> bool {
        let mut state = self.state();
        let Some(stop_tx) = state.stop_tx.take() else {
            return false;
        };
        let _ = stop_tx.send(true);
        tracing::info!("Export scheduler stopped");
        true
    }

    /// Stop and wait for an in-flight cycle to finish
    ///
    /// Returns `true` if the loop exited within `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.stop();
        let handle = self.state().handle.take();
        let Some(handle) = handle else {
            return true;
        };

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Export scheduler task ended abnormally");
                true
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = timeout.as_secs(),
                    "Timed out waiting for the running export cycle"
                );
                false
            }
        }
    }
}

async fn run_loop(pipeline: Arc<ExportPipeline>, period: Duration, mut stop_rx: watch::Receiver<bool>) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *stop_rx.borrow() {
            break;
        }

        pipeline.run_cycle().await;

        tokio::select! {
            changed = stop_rx.changed() => {
                // Err means the scheduler itself was dropped
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {}
        }
    }

    tracing::debug!("Export scheduler loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryRepository;
    use crate::config::StagingConfig;
    use crate::core::export::{ExportFileWriter, ExportProcessor, WriterOptions};
    use crate::core::layout::LayoutSet;
    use tempfile::TempDir;

    fn scheduler(interval: Duration) -> (TempDir, Arc<InMemoryRepository>, ExportScheduler) {
        let dir = TempDir::new().unwrap();
        let repository = Arc::new(InMemoryRepository::new(StagingConfig::default()));
        let writer = ExportFileWriter::new(WriterOptions {
            directory: dir.path().to_path_buf(),
            ..WriterOptions::default()
        });
        let pipeline = Arc::new(ExportPipeline::new(ExportProcessor::new(
            repository.clone(),
            LayoutSet::standard(),
            writer,
            false,
        )));
        (dir, repository, ExportScheduler::new(pipeline, interval))
    }

    #[tokio::test]
    async fn test_start_runs_first_cycle_immediately() {
        let (_dir, repository, scheduler) = scheduler(Duration::from_secs(3600));

        assert!(scheduler.start());
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(repository.list_calls(), 1);
        assert!(scheduler.shutdown(Duration::from_secs(5)).await);
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let (_dir, repository, scheduler) = scheduler(Duration::from_secs(3600));

        assert!(scheduler.start());
        assert!(!scheduler.start());
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(repository.list_calls(), 1);
        assert!(scheduler.is_running());
        scheduler.shutdown(Duration::from_secs(5)).await;
    }

    #[tokio::test]
    async fn test_stop_prevents_future_cycles() {
        let (_dir, repository, scheduler) = scheduler(Duration::from_millis(50));

        scheduler.start();
        tokio::time::sleep(Duration::from_millis(180)).await;
        assert!(scheduler.stop());
        assert!(!scheduler.is_running());
        assert!(!scheduler.stop());

        assert!(scheduler.shutdown(Duration::from_secs(5)).await);
        let after_stop = repository.list_calls();
        assert!(after_stop >= 2);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(repository.list_calls(), after_stop);
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let (_dir, repository, scheduler) = scheduler(Duration::from_secs(3600));

        scheduler.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(scheduler.shutdown(Duration::from_secs(5)).await);
        assert!(scheduler.start());
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(repository.list_calls(), 2);
        scheduler.shutdown(Duration::from_secs(5)).await;
    }

    #[test]
    fn test_zero_interval_is_raised() {
        let (_dir, _repository, scheduler) = scheduler(Duration::ZERO);
        assert_eq!(scheduler.interval(), Duration::from_millis(1));
    }

    #[tokio::test]
    async fn test_huge_interval_is_capped() {
        let (_dir, repository, scheduler) = scheduler(Duration::MAX);
        assert_eq!(scheduler.interval(), Duration::from_secs(7 * 24 * 60 * 60));

        assert!(scheduler.start());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(repository.list_calls(), 1);
        assert!(scheduler.shutdown(Duration::from_secs(5)).await);
    }
}
