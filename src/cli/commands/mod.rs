//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod init;
pub mod once;
pub mod run;
pub mod status;
pub mod validate;

use crate::config::{load_config, OrderExportConfig};

/// Load and validate the configuration, printing the problem on failure
///
/// Returns the configuration error exit code (2) when it cannot be used.
pub(crate) fn load_checked_config(config_path: &str) -> Result<OrderExportConfig, i32> {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, config_path = %config_path, "Failed to load configuration");
            eprintln!("Failed to load configuration file {config_path}: {e}");
            return Err(2);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Configuration validation failed");
        eprintln!("Configuration validation failed: {e}");
        return Err(2);
    }

    Ok(config)
}
