//! In-process staging store

pub mod repository;

pub use repository::{FailurePoint, InMemoryRepository};
