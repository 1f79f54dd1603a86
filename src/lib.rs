// Order Export - Scheduled ERP order export
// Copyright (c) 2025 Order Export Contributors
// Licensed under the MIT License

//! # Order Export
//!
//! Periodically exports staged sales orders from an ERP staging area as
//! tab-delimited header and line files for a downstream order-import reader.
//!
//! ## Overview
//!
//! Each import set is one order: a header row and its line rows, staged in
//! two tables and identified by a textual id. A cycle:
//!
//! - **Lists** the import sets whose header is not yet flagged exported
//! - **Renders** the header and lines through fixed field layouts
//! - **Writes** `SOH<id>.txt` and `SOL<id>.txt` as one unit
//! - **Flags** the header exported only after both files are in place
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Layouts, export cycles and the scheduler
//! - [`adapters`] - Staging repositories (PostgreSQL, in-memory)
//! - [`domain`] - Import set records, ids and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use order_export::config::load_config;
//! use order_export::core::export::ExportPipeline;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("order-export.toml")?;
//!     let pipeline = ExportPipeline::from_config(&config)?;
//!
//!     let summary = pipeline.run_cycle().await;
//!     println!("Exported {} import sets", summary.exported);
//!     Ok(())
//! }
//! ```
//!
//! ## Layouts
//!
//! A layout is an ordered list of field specs. Missing values render empty,
//! long values are cut to the field width:
//!
//! ```rust
//! use order_export::core::layout::LayoutSet;
//! use order_export::domain::Record;
//!
//! let layouts = LayoutSet::standard();
//! let header = Record::new().with("Import_Set_No", "5");
//! let rendered = layouts.header.render(&header);
//! assert!(rendered.starts_with("0005\t"));
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`]. Failures of a single import
//! set are reported as [`domain::ImportSetError`] and never stop a cycle.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
