//! Staging store integrations.
//!
//! - [`database`] - Repository trait and factory
//! - [`postgresql`] - PostgreSQL staging tables
//! - [`memory`] - In-process store for tests and local dry runs
//!
//! # Design Pattern
//!
//! Adapters isolate the staging store behind [`database::ImportSetRepository`]
//! so the export pipeline can be driven by either backend.
//!
//! ```rust
//! use order_export::adapters::database::ImportSetRepository;
//! use order_export::adapters::memory::InMemoryRepository;
//! use order_export::config::StagingConfig;
//! use order_export::domain::Record;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = InMemoryRepository::new(StagingConfig::default());
//! repository.insert_header(Record::new().with("Import_Set_No", "1"));
//!
//! let pending = repository.list_pending_import_sets().await?;
//! assert_eq!(pending.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod memory;
pub mod postgresql;
