//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DatabaseTarget, OrderExportConfig};
use super::secret::secret_connection_string;
use crate::domain::errors::OrderExportError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "ORDER_EXPORT_";

/// Export directory variable honoured by earlier deployments
pub const LEGACY_EXPORT_DIR_VAR: &str = "TMP_OE_EXPORT_DIR";

/// Cycle interval variable honoured by earlier deployments
pub const LEGACY_INTERVAL_VAR: &str = "TMP_OE_EXPORT_INTERVAL_MINUTES";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into OrderExportConfig
/// 4. Applies environment variable overrides (legacy TMP_OE_* then ORDER_EXPORT_*)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a referenced
/// environment variable is not set, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use order_export::config::loader::load_config;
///
/// let config = load_config("order-export.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<OrderExportConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(OrderExportError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        OrderExportError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_str(&contents)
}

/// Loads configuration from TOML text
///
/// # Errors
///
/// Same as [`load_config`], minus the file access.
pub fn load_config_str(contents: &str) -> Result<OrderExportConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: OrderExportConfig = toml::from_str(&contents)
        .map_err(|e| OrderExportError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        OrderExportError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left alone.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| OrderExportError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(OrderExportError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{key}")).ok()
}

/// Leading integer of a value, ignoring anything after it (`"15min"` is 15)
fn leading_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

/// Applies environment variable overrides
///
/// Legacy `TMP_OE_EXPORT_DIR` / `TMP_OE_EXPORT_INTERVAL_MINUTES` are read
/// first, then `ORDER_EXPORT_<SECTION>_<KEY>` variables, which win.
/// Unparseable numeric values leave the configured value in place.
fn apply_env_overrides(config: &mut OrderExportConfig) -> Result<()> {
    // Legacy deployment variables
    if let Ok(val) = std::env::var(LEGACY_EXPORT_DIR_VAR) {
        if !val.trim().is_empty() {
            config.export.directory = PathBuf::from(val);
        }
    }
    if let Ok(val) = std::env::var(LEGACY_INTERVAL_VAR) {
        if let Some(minutes) = leading_integer(&val) {
            config.export.interval_minutes = minutes;
        }
    }

    // Application overrides
    if let Some(val) = env("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env("APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Database overrides
    if let Some(val) = env("DATABASE_TARGET") {
        config.database_target = match val.to_lowercase().as_str() {
            "postgresql" | "postgres" => DatabaseTarget::PostgreSQL,
            "memory" => DatabaseTarget::Memory,
            _ => {
                return Err(OrderExportError::Configuration(format!(
                    "Invalid {ENV_PREFIX}DATABASE_TARGET '{val}'. Must be one of: postgresql, memory"
                )))
            }
        };
    }
    if let Some(ref mut pg_config) = config.postgresql {
        if let Some(val) = env("POSTGRESQL_CONNECTION_STRING") {
            pg_config.connection_string = secret_connection_string(val);
        }
        if let Some(val) = env("POSTGRESQL_MAX_CONNECTIONS") {
            if let Ok(max) = val.parse() {
                pg_config.max_connections = max;
            }
        }
        if let Some(val) = env("POSTGRESQL_SSL_MODE") {
            pg_config.ssl_mode = val;
        }
    }
    if let Some(val) = env("MEMORY_SEED_FILE") {
        config.memory.seed_file = Some(PathBuf::from(val));
    }

    // Staging overrides
    if let Some(val) = env("STAGING_HEADER_TABLE") {
        config.staging.header_table = val;
    }
    if let Some(val) = env("STAGING_LINE_TABLE") {
        config.staging.line_table = val;
    }
    if let Some(val) = env("STAGING_EXPORTED_VALUE") {
        config.staging.exported_value = val;
    }

    // Export overrides
    if let Some(val) = env("EXPORT_DIRECTORY") {
        config.export.directory = PathBuf::from(val);
    }
    if let Some(val) = env("EXPORT_INTERVAL_MINUTES") {
        if let Some(minutes) = leading_integer(&val) {
            config.export.interval_minutes = minutes;
        }
    }
    if let Some(val) = env("EXPORT_LINE_ENDING") {
        config.export.line_ending = val.parse().map_err(OrderExportError::Configuration)?;
    }
    if let Some(val) = env("EXPORT_DRY_RUN") {
        config.export.dry_run = val.parse().unwrap_or(false);
    }

    // Layout overrides
    if let Some(val) = env("LAYOUT_VARIANT") {
        config.layout.variant = val.parse().map_err(OrderExportError::Configuration)?;
    }

    // Logging overrides
    if let Some(val) = env("LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Some(val) = env("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("ORDER_EXPORT_LOADER_TEST_VAR", "test_value");
        let input = "password = \"${ORDER_EXPORT_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"");
        std::env::remove_var("ORDER_EXPORT_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("ORDER_EXPORT_LOADER_MISSING_VAR");
        let input = "password = \"${ORDER_EXPORT_LOADER_MISSING_VAR}\"";
        assert!(substitute_env_vars(input).is_err());
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        let input = "# connection_string = \"${ORDER_EXPORT_LOADER_UNSET_IN_COMMENT}\"\nkey = 1";
        assert_eq!(substitute_env_vars(input).unwrap(), input);
    }

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer("15"), Some(15));
        assert_eq!(leading_integer(" 5 "), Some(5));
        assert_eq!(leading_integer("2.5"), Some(2));
        assert_eq!(leading_integer("10min"), Some(10));
        assert_eq!(leading_integer("-3"), Some(-3));
        assert_eq!(leading_integer("abc"), None);
        assert_eq!(leading_integer(""), None);
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config("nonexistent-order-export.toml").is_err());
    }
}
