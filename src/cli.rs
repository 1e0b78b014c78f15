use crate::config::{LogFormat, RuntimeConfig};
use clap::Parser;
use std::path::PathBuf;

/// Creates or updates a Glue table that contains Config snapshots stored in a
/// Control Tower LogArchive account.
#[derive(Debug, Parser)]
#[command(name = "ct-snapshot-table")]
#[command(version)]
#[command(
    about = "Creates or updates a Glue table that contains Config snapshots stored in a Control Tower LogArchive account.",
    long_about = None
)]
#[command(
    after_help = "NOTES: The source Config data is expected in the standard folder/prefix naming convention that Control Tower uses: <org id>/AWSLogs/<account_number>/Config/<region>/<year>/<month>/<day>/ConfigSnapshot"
)]
pub struct Cli {
    /// The Control Tower Logs source bucket where Config data is stored
    #[arg(long = "s3_source_bucket", value_name = "BUCKET")]
    pub s3_source_bucket: Option<String>,

    /// The name of the Glue database to create the table in
    #[arg(long = "database_name", value_name = "NAME")]
    pub database_name: Option<String>,

    /// The name of the Glue table to create or overwrite
    #[arg(long = "table_name", value_name = "NAME")]
    pub table_name: Option<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// AWS region (defaults to the ambient AWS configuration)
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    /// Athena workgroup used to run the DDL
    #[arg(long, value_name = "NAME")]
    pub workgroup: Option<String>,

    /// S3 location for Athena query results
    #[arg(long, value_name = "S3_URI")]
    pub output_location: Option<String>,

    /// Discover partitions and print the CREATE TABLE statement without touching the catalog
    #[arg(long)]
    pub dry_run: bool,

    // Not used; Glue passes these to every job
    #[arg(long = "extra-py-files", hide = true)]
    pub extra_py_files: Option<String>,
    #[arg(long = "scriptLocation", hide = true)]
    pub script_location: Option<String>,
    #[arg(long = "job-bookmark-option", hide = true)]
    pub job_bookmark_option: Option<String>,
    #[arg(long = "job-language", hide = true)]
    pub job_language: Option<String>,
    #[arg(long = "connection-names", hide = true)]
    pub connection_names: Option<String>,
}

impl Cli {
    /// Apply CLI overrides (highest priority)
    pub fn apply_overrides(&self, config: &mut RuntimeConfig) {
        if let Some(bucket) = &self.s3_source_bucket {
            config.source.bucket = bucket.clone();
        }
        if let Some(database) = &self.database_name {
            config.catalog.database = database.clone();
        }
        if let Some(table) = &self.table_name {
            config.catalog.table = table.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(region) = &self.region {
            config.aws.region = Some(region.clone());
        }
        if let Some(workgroup) = &self.workgroup {
            config.catalog.workgroup = workgroup.clone();
        }
        if let Some(location) = &self.output_location {
            config.catalog.output_location = Some(location.clone());
        }
    }
}
