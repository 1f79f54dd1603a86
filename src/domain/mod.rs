//! Domain models and types for the order exporter.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ImportSetId`])
//! - **Staged order records** ([`Header`], [`Line`], [`Record`], [`ExportFlag`])
//! - **Error types** ([`OrderExportError`], [`ImportSetError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, OrderExportError>`]:
//!
//! ```rust
//! use order_export::domain::{OrderExportError, Result};
//!
//! fn example() -> Result<()> {
//!     // Errors are automatically converted using the ? operator
//!     let _config = order_export::config::load_config("order-export.toml")?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod order;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{ExportStage, ImportSetError, OrderExportError};
pub use ids::ImportSetId;
pub use order::{ExportFlag, Header, Line, Record};
pub use result::Result;
