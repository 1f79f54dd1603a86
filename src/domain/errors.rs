//! Domain error types
//!
//! This module defines the error hierarchy for the order exporter.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main order-export error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum OrderExportError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Staging database errors
    #[error("Database error: {0}")]
    Database(String),

    /// Field layout errors (bad field spec, unknown layout variant)
    #[error("Layout error: {0}")]
    Layout(String),

    /// Export process errors
    #[error("Export error: {0}")]
    Export(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network/connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// Export-flag state errors
    #[error("State management error: {0}")]
    State(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Stage of the per-import-set export at which a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStage {
    /// Reading the header or lines from staging
    Fetch,
    /// Rendering records through the field layout
    Render,
    /// Writing the header/line file pair
    Write,
    /// Flagging the header as exported after the files were written
    MarkExported,
}

impl std::fmt::Display for ExportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExportStage::Fetch => "fetch",
            ExportStage::Render => "render",
            ExportStage::Write => "write",
            ExportStage::MarkExported => "mark_exported",
        };
        f.write_str(name)
    }
}

/// Failure while exporting a single import set
///
/// Carries the import-set id and the stage so the cycle can log it and move on.
/// A [`ExportStage::MarkExported`] failure means the files are already on disk.
#[derive(Debug, Error)]
#[error("Import set {import_set} failed during {stage}: {source}")]
pub struct ImportSetError {
    /// Import set that failed
    pub import_set: String,

    /// Stage at which it failed
    pub stage: ExportStage,

    /// Underlying cause
    #[source]
    pub source: OrderExportError,
}

impl ImportSetError {
    /// Creates a new import-set error
    pub fn new(import_set: impl Into<String>, stage: ExportStage, source: OrderExportError) -> Self {
        Self {
            import_set: import_set.into(),
            stage,
            source,
        }
    }

    /// Whether the files were written before the failure
    ///
    /// The import set stays pending and will be written again on the next cycle.
    pub fn is_post_write(&self) -> bool {
        self.stage == ExportStage::MarkExported
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for OrderExportError {
    fn from(err: std::io::Error) -> Self {
        OrderExportError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for OrderExportError {
    fn from(err: serde_json::Error) -> Self {
        OrderExportError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for OrderExportError {
    fn from(err: toml::de::Error) -> Self {
        OrderExportError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrderExportError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_import_set_error_display() {
        let err = ImportSetError::new(
            "0005",
            ExportStage::Write,
            OrderExportError::Io("disk full".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "Import set 0005 failed during write: I/O error: disk full"
        );
        assert!(!err.is_post_write());
    }

    #[test]
    fn test_import_set_error_post_write() {
        let err = ImportSetError::new(
            "12",
            ExportStage::MarkExported,
            OrderExportError::Database("deadlock".to_string()),
        );
        assert!(err.is_post_write());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: OrderExportError = io_err.into();
        assert!(matches!(err, OrderExportError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: OrderExportError = json_err.into();
        assert!(matches!(err, OrderExportError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: OrderExportError = toml_err.into();
        assert!(matches!(err, OrderExportError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_import_set_error_exposes_source() {
        use std::error::Error as _;

        let err = ImportSetError::new(
            "7",
            ExportStage::Fetch,
            OrderExportError::Database("timeout".to_string()),
        );
        assert!(err.source().is_some());
    }
}
