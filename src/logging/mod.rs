//! Logging and observability
//!
//! Structured logging through `tracing`: human-readable console output plus
//! an optional JSON file with rotation.
//!
//! # Example
//!
//! ```no_run
//! use order_export::logging::init_logging;
//! use order_export::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(import_set = "0005", "Import set exported");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the start of an export cycle
///
/// # Example
///
/// ```no_run
/// use order_export::log_cycle_start;
///
/// log_cycle_start!("c0ffee", 3);
/// ```
#[macro_export]
macro_rules! log_cycle_start {
    ($cycle_id:expr, $pending:expr) => {
        tracing::info!(
            cycle_id = %$cycle_id,
            pending = $pending,
            "Starting export cycle"
        );
    };
}

/// Log the completion of an export cycle
#[macro_export]
macro_rules! log_cycle_complete {
    ($cycle_id:expr, $pending:expr, $exported:expr, $skipped:expr, $failed:expr, $duration_ms:expr) => {
        tracing::info!(
            cycle_id = %$cycle_id,
            pending = $pending,
            exported = $exported,
            skipped = $skipped,
            failed = $failed,
            duration_ms = $duration_ms,
            "Export cycle completed"
        );
    };
}

/// Log a failed import set with its stage
///
/// Failures after the files were written are logged with `reconcile = true`
/// so operators can find files whose header was never flagged.
#[macro_export]
macro_rules! log_import_set_failure {
    ($error:expr) => {
        if $error.is_post_write() {
            tracing::error!(
                import_set = %$error.import_set,
                stage = %$error.stage,
                error = %$error.source,
                reconcile = true,
                "Export files written but header not flagged"
            );
        } else {
            tracing::error!(
                import_set = %$error.import_set,
                stage = %$error.stage,
                error = %$error.source,
                "Import set export failed"
            );
        }
    };
}
