//! Configuration management for the order exporter.
//!
//! # Overview
//!
//! Configuration is a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `ORDER_EXPORT_<SECTION>_<KEY>` overrides, plus the legacy
//!   `TMP_OE_EXPORT_DIR` and `TMP_OE_EXPORT_INTERVAL_MINUTES` variables
//! - Default values for everything except the database connection
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use order_export::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("order-export.toml")?;
//!
//! println!("Export directory: {}", config.export.directory.display());
//! println!("Interval: {:?}", config.export.interval());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry run
//! - [`PostgreSQLConfig`] - Staging database connection
//! - [`MemoryConfig`] - In-memory staging store seed
//! - [`StagingConfig`] - Staging table/column names and the exported sentinel
//! - [`ExportConfig`] - Output directory, file naming, schedule
//! - [`LayoutConfig`] - Field layout variant and date modes
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! database_target = "postgresql"
//!
//! [postgresql]
//! connection_string = "${ORDER_EXPORT_DATABASE_URL}"
//!
//! [export]
//! directory = "/var/spool/erp/orders"
//! interval_minutes = 30
//!
//! [layout]
//! variant = "standard"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_str};
pub use schema::{
    ApplicationConfig, DatabaseTarget, ExportConfig, LayoutConfig, LoggingConfig, MemoryConfig,
    OrderExportConfig, PostgreSQLConfig, StagingConfig, MAX_INTERVAL_MINUTES,
};
pub use secret::{secret_connection_string, ConnectionString, SecretConnectionString};
