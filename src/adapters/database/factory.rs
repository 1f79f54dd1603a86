//! Staging repository factory
//!
//! This module creates the staging repository selected by configuration.

use crate::adapters::database::traits::ImportSetRepository;
use crate::adapters::memory::InMemoryRepository;
use crate::adapters::postgresql::{PostgreSQLClient, PostgreSQLRepository};
use crate::config::schema::{DatabaseTarget, OrderExportConfig};
use crate::domain::{OrderExportError, Result};
use std::sync::Arc;

/// Create a staging repository based on the configuration
///
/// This factory function examines the `database_target` in the configuration
/// and creates the appropriate repository implementation. No connection is
/// opened here; the first cycle tests connectivity.
///
/// # Errors
///
/// Returns an error if the backend configuration is missing or invalid
pub fn create_repository(config: &OrderExportConfig) -> Result<Arc<dyn ImportSetRepository>> {
    match config.database_target {
        DatabaseTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                OrderExportError::Configuration(
                    "postgresql configuration is required when database_target = 'postgresql'"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL staging repository");
            let client = Arc::new(PostgreSQLClient::new(pg_config.clone())?);
            tracing::debug!(database = %client.connection_string_safe(), "PostgreSQL pool ready");

            Ok(Arc::new(PostgreSQLRepository::new(
                client,
                config.staging.clone(),
            )))
        }
        DatabaseTarget::Memory => {
            let repository = match &config.memory.seed_file {
                Some(path) => {
                    tracing::info!(seed_file = %path.display(), "Creating in-memory staging repository");
                    InMemoryRepository::from_seed_file(config.staging.clone(), path)?
                }
                None => {
                    tracing::info!("Creating empty in-memory staging repository");
                    InMemoryRepository::new(config.staging.clone())
                }
            };

            Ok(Arc::new(repository))
        }
    }
}
