//! Staging repository traits
//!
//! This module defines the trait that staging backends must implement
//! for the export pipeline to read import sets and flag them exported.

use crate::domain::{Header, ImportSetId, Line, Result};
use async_trait::async_trait;

/// Access to the staged order header and line tables
///
/// Every operation checks out its own connection (where the backend has
/// any) and releases it before returning, whether or not it failed.
#[async_trait]
pub trait ImportSetRepository: Send + Sync {
    /// Test that the staging store is reachable
    ///
    /// # Errors
    ///
    /// Returns an error if the connection test fails.
    async fn test_connection(&self) -> Result<()>;

    /// List the ids of import sets whose header is not yet exported
    ///
    /// Ids are distinct, numeric ids ascending first, then non-numeric ids
    /// in text order. Blank ids are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing query fails.
    async fn list_pending_import_sets(&self) -> Result<Vec<ImportSetId>>;

    /// Fetch the header of an import set
    ///
    /// When several rows share the id, the first in insertion order wins and
    /// a warning is logged.
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the import set has no header.
    async fn fetch_header(&self, id: &ImportSetId) -> Result<Option<Header>>;

    /// Fetch the lines of an import set, ordered by line number
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn fetch_lines(&self, id: &ImportSetId) -> Result<Vec<Line>>;

    /// Set the header export flag to the exported sentinel
    ///
    /// # Returns
    ///
    /// Returns the number of header rows updated.
    async fn mark_exported(&self, id: &ImportSetId) -> Result<u64>;

    /// Backend name for logs
    fn backend_name(&self) -> &str;
}
