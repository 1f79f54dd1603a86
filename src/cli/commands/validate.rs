//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the exporter configuration file.

use crate::config::load_config;
use crate::config::schema::DatabaseTarget;
use crate::core::layout::{FieldSpec, Layout};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also print every field of the selected layouts
    #[arg(long)]
    pub show_layout: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if let Err(e) = config.validate() {
            println!("❌ Configuration validation failed");
            println!("   Error: {e}");
            println!();
            return Ok(2);
        }

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.is_dry_run());

        match config.database_target {
            DatabaseTarget::PostgreSQL => {
                if let Some(ref pg_config) = config.postgresql {
                    use secrecy::ExposeSecret;
                    println!("  Staging Store: PostgreSQL");
                    println!(
                        "  PostgreSQL Connection: {}",
                        pg_config
                            .connection_string
                            .expose_secret()
                            .after_credentials()
                            .unwrap_or("***")
                    );
                    println!("  Max Connections: {}", pg_config.max_connections);
                    println!("  SSL Mode: {}", pg_config.ssl_mode);
                }
            }
            DatabaseTarget::Memory => {
                println!("  Staging Store: memory");
                if let Some(ref seed) = config.memory.seed_file {
                    println!("  Seed File: {}", seed.display());
                }
            }
        }

        println!(
            "  Staging Tables: {} / {}",
            config.staging.header_table, config.staging.line_table
        );
        println!("  Exported Value: {:?}", config.staging.exported_value);
        println!("  Export Directory: {}", config.export.directory.display());
        println!(
            "  Interval: {} minute(s)",
            config.export.interval().as_secs() / 60
        );
        println!(
            "  File Names: {}<id>.{} / {}<id>.{}",
            config.export.header_prefix,
            config.export.extension,
            config.export.line_prefix,
            config.export.extension
        );
        println!("  Line Ending: {}", config.export.line_ending.as_str().escape_default());
        println!("  Layout: {}", config.layout.variant);

        if self.show_layout {
            let layouts = config.layout_set();
            print_layout(&layouts.header);
            print_layout(&layouts.line);
        }

        println!();
        Ok(0)
    }
}

fn print_layout(layout: &Layout) {
    println!();
    println!("  {} ({} fields):", layout.name(), layout.fields().len());
    for (index, field) in layout.fields().iter().enumerate() {
        println!("    {:>3}  {}", index + 1, describe_field(field));
    }
}

fn describe_field(field: &FieldSpec) -> String {
    let mut text = field.key.to_string();
    if let Some(width) = field.width {
        text.push_str(&format!(" width={width}"));
    }
    if let Some(length) = field.zero_pad {
        text.push_str(&format!(" zero-pad={length}"));
    }
    if let Some(formatter) = field.formatter {
        text.push_str(&format!(" {formatter:?}"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::ValueFormatter;

    #[test]
    fn test_validate_args_creation() {
        let args = ValidateArgs { show_layout: false };
        let _ = format!("{args:?}");
    }

    #[test]
    fn test_describe_field_lists_set_options() {
        let field = FieldSpec::new("Import_Set_No")
            .width(8)
            .zero_pad(4)
            .formatter(ValueFormatter::Quantity);
        assert_eq!(
            describe_field(&field),
            "Import_Set_No width=8 zero-pad=4 Quantity"
        );
        assert_eq!(describe_field(&FieldSpec::new("Notes")), "Notes");
    }

    #[tokio::test]
    async fn test_validate_missing_file_is_config_error() {
        let args = ValidateArgs { show_layout: false };
        let code = args.execute("/nonexistent/order-export.toml").await.unwrap();
        assert_eq!(code, 2);
    }
}
