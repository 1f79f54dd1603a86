//! Export of staged import sets
//!
//! - [`writer`] writes the header and line files for one import set
//! - [`processor`] exports a single import set end to end
//! - [`cycle`] runs one pass over every pending import set
//! - [`summary`] reports what a cycle did

pub mod cycle;
pub mod processor;
pub mod summary;
pub mod writer;

pub use cycle::ExportPipeline;
pub use processor::{ExportProcessor, ImportSetOutcome, SkipReason};
pub use summary::{CycleStatus, CycleSummary, ImportSetReport};
pub use writer::{ExportFileWriter, ExportFiles, LineEnding, WriterOptions};
