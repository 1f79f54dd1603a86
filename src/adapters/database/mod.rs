//! Staging store abstraction layer
//!
//! This module provides the trait-based seam between the export pipeline and
//! the staging tables, allowing PostgreSQL or the in-memory store behind it.

pub mod factory;
pub mod traits;

pub use factory::create_repository;
pub use traits::ImportSetRepository;
