// Runtime configuration for ct-snapshot-table
//
// Sources, lowest priority first:
// 1. Built-in defaults
// 2. TOML file (--config, CT_SNAPSHOT_CONFIG, or ./ct-snapshot.toml)
// 3. Environment variables (CT_SNAPSHOT_* prefix)
// 4. Command-line flags (applied by the CLI layer)
//
// The resolved config is built once at startup and passed by reference.

use anyhow::Result;
use ct_snapshot_aws::{AthenaSettings, AwsConnection};
use ct_snapshot_core::TableTarget;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{EnvSource, ENV_PREFIX};
pub use sources::StdEnvSource;

/// Main runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub aws: AwsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Control Tower log-archive bucket holding the Config snapshots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub bucket: String,
}

/// Target table and Athena execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub database: String,
    pub table: String,
    pub workgroup: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_location: Option<String>,
    pub poll_interval_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database: String::new(),
            table: String::new(),
            workgroup: "primary".to_string(),
            output_location: None,
            poll_interval_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

impl RuntimeConfig {
    /// Load defaults, then the config file, then environment overrides.
    ///
    /// `path` wins over `CT_SNAPSHOT_CONFIG` and the default file location.
    /// Validation is left to the caller so CLI flags can fill required fields.
    pub fn load(path: Option<&std::path::Path>) -> Result<Self> {
        sources::load_config(path, &StdEnvSource)
    }

    /// Parse a TOML document on top of the defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Merge another config into this one (used for TOML layering).
    pub fn merge(&mut self, other: RuntimeConfig) {
        self.source = other.source;
        self.catalog = other.catalog;
        self.aws = other.aws;
        self.logging = other.logging;
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    pub fn table_target(&self) -> TableTarget {
        TableTarget {
            database: self.catalog.database.clone(),
            table: self.catalog.table.clone(),
            bucket: self.source.bucket.clone(),
        }
    }

    pub fn athena_settings(&self) -> AthenaSettings {
        AthenaSettings {
            workgroup: self.catalog.workgroup.clone(),
            output_location: self.catalog.output_location.clone(),
            poll_interval: Duration::from_millis(self.catalog.poll_interval_ms),
        }
    }

    pub fn aws_connection(&self) -> AwsConnection {
        AwsConnection {
            region: self.aws.region.clone(),
            endpoint_url: self.aws.endpoint_url.clone(),
        }
    }
}
