// Configuration validation
//
// Validates that required fields are present and values are usable as Athena
// identifiers and S3 names.

use super::*;
use anyhow::{bail, Result};
use tracing::warn;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_source_config(&config.source)?;
    validate_catalog_config(&config.catalog)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_source_config(config: &SourceConfig) -> Result<()> {
    if config.bucket.is_empty() {
        bail!(
            "Source bucket is required\n\n\
            How to fix:\n\
              • CLI: --s3_source_bucket aws-controltower-logs-<account>-<region>\n\
              • Environment: export {}SOURCE_BUCKET=<bucket>\n\
              • TOML: [source]\n              bucket = \"<bucket>\"",
            ENV_PREFIX
        );
    }

    validate_bucket_name(&config.bucket)
        .map_err(|e| anyhow::anyhow!("Invalid source bucket '{}': {}", config.bucket, e))
}

fn validate_catalog_config(config: &CatalogConfig) -> Result<()> {
    if config.database.is_empty() {
        bail!(
            "Database name is required\n\n\
            How to fix:\n\
              • CLI: --database_name <name>\n\
              • Environment: export {}DATABASE_NAME=<name>\n\
              • TOML: [catalog]\n              database = \"<name>\"",
            ENV_PREFIX
        );
    }

    if config.table.is_empty() {
        bail!(
            "Table name is required\n\n\
            How to fix:\n\
              • CLI: --table_name <name>\n\
              • Environment: export {}TABLE_NAME=<name>\n\
              • TOML: [catalog]\n              table = \"<name>\"",
            ENV_PREFIX
        );
    }

    validate_identifier("database", &config.database)?;
    validate_identifier("table", &config.table)?;

    if config.workgroup.is_empty() {
        bail!("catalog.workgroup must not be empty");
    }

    if let Some(location) = &config.output_location {
        if !location.starts_with("s3://") {
            bail!(
                "catalog.output_location must be an s3:// URI, got '{}'",
                location
            );
        }
    }

    if config.poll_interval_ms == 0 {
        bail!("catalog.poll_interval_ms must be greater than 0");
    }

    if config.poll_interval_ms > 60_000 {
        warn!(
            poll_interval_ms = config.poll_interval_ms,
            "catalog.poll_interval_ms is very large; DDL completion will be slow to notice"
        );
    }

    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        bail!("logging.level must not be empty");
    }
    Ok(())
}

/// Athena database and table names: lowercase letters, digits and underscores.
fn validate_identifier(kind: &str, name: &str) -> Result<()> {
    if name.len() > 255 {
        bail!("{} name must be at most 255 characters", kind);
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        bail!(
            "{} name '{}' may only contain lowercase letters, numbers, and underscores\n\n\
            How to fix:\n\
              • Use '{}' (Glue stores names lowercased)",
            kind,
            name,
            name.to_ascii_lowercase()
        );
    }

    Ok(())
}

fn validate_bucket_name(input: &str) -> Result<(), String> {
    if input.len() < 3 || input.len() > 63 {
        return Err("Bucket name must be 3-63 characters".to_string());
    }
    if !input
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(
            "Bucket name must contain only lowercase letters, numbers, hyphens, and dots"
                .to_string(),
        );
    }
    if input.starts_with('-') || input.ends_with('-') {
        return Err("Bucket name cannot start or end with a hyphen".to_string());
    }
    Ok(())
}
