//! Core export logic.
//!
//! # Modules
//!
//! - [`layout`] - Fixed field layouts and value formatters
//! - [`export`] - File writing, per import set export and export cycles
//! - [`scheduler`] - Recurring cycles with start and stop
//!
//! # Example
//!
//! ```rust,no_run
//! use order_export::config::load_config;
//! use order_export::core::export::ExportPipeline;
//! use order_export::core::scheduler::ExportScheduler;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("order-export.toml")?;
//! let pipeline = Arc::new(ExportPipeline::from_config(&config)?);
//!
//! let scheduler = ExportScheduler::from_config(pipeline, &config);
//! scheduler.start();
//! // ... until a shutdown signal arrives
//! scheduler.shutdown(config.export.shutdown_timeout()).await;
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod layout;
pub mod scheduler;
