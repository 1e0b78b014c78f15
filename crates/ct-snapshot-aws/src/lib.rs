//! AWS adapters: S3 for prefix listing, Glue + Athena for the catalog.

pub mod catalog;
pub mod s3;
pub mod uri;

pub use catalog::{default_results_bucket, AthenaSettings, GlueAthenaCatalog, QueryProgress};
pub use s3::S3PrefixLister;
pub use uri::S3Uri;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::info;

/// Connection overrides on top of the ambient AWS provider chain
#[derive(Debug, Clone, Default)]
pub struct AwsConnection {
    pub region: Option<String>,
    /// Custom endpoint (LocalStack, MinIO); also switches S3 to path-style
    pub endpoint_url: Option<String>,
}

/// Shared SDK config from the environment plus overrides.
pub async fn load_sdk_config(conn: &AwsConnection) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &conn.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(endpoint) = &conn.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    let config = loader.load().await;
    info!(
        region = config.region().map(|r| r.as_ref()).unwrap_or("<unset>"),
        endpoint = conn.endpoint_url.as_deref().unwrap_or("<default>"),
        "Loaded AWS configuration"
    );
    config
}

fn s3_client(sdk_config: &SdkConfig, conn: &AwsConnection) -> aws_sdk_s3::Client {
    let s3_config = aws_sdk_s3::config::Builder::from(sdk_config)
        .force_path_style(conn.endpoint_url.is_some())
        .build();
    aws_sdk_s3::Client::from_conf(s3_config)
}

/// Build the S3 lister for `sdk_config`.
pub fn s3_lister(sdk_config: &SdkConfig, conn: &AwsConnection) -> S3PrefixLister {
    S3PrefixLister::new(s3_client(sdk_config, conn))
}

/// Build the Glue + Athena catalog for `sdk_config`.
///
/// S3 and STS are only called when no query result location is configured
/// anywhere and the default results bucket has to be derived.
pub fn glue_athena_catalog(
    sdk_config: &SdkConfig,
    conn: &AwsConnection,
    settings: AthenaSettings,
) -> GlueAthenaCatalog {
    GlueAthenaCatalog::new(
        aws_sdk_glue::Client::new(sdk_config),
        aws_sdk_athena::Client::new(sdk_config),
        s3_client(sdk_config, conn),
        aws_sdk_sts::Client::new(sdk_config),
        sdk_config.region().map(|r| r.to_string()),
        settings,
    )
}
