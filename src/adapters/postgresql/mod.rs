//! PostgreSQL staging store
//!
//! This module provides the pooled client and the repository that reads
//! staged order headers and lines from PostgreSQL.

pub mod client;
pub mod repository;

pub use client::PostgreSQLClient;
pub use repository::{quote_identifier, PostgreSQLRepository, StagingQueries};
