// ct-snapshot-table - Athena table over Control Tower Config snapshots
//
// One run is two strictly sequential phases:
// 1. Discover orgs, accounts, regions and the earliest date from the
//    log-archive bucket's prefix layout
// 2. Drop the target table if it exists and recreate it with partition
//    projection matching what was discovered
//
// Any failure aborts the run. There are no retries and no rollback.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ct_snapshot_aws::S3Uri;
use ct_snapshot_core::{
    discover, render_create_table, CatalogClient, Discovery, PrefixLister, ProvisionOutcome,
    TableProvisioner,
};
use tracing::info;

pub mod cli;
pub mod config;
mod init;

pub use config::RuntimeConfig;
pub use init::init_tracing;

/// Whether the catalog is touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Drop and recreate the table
    Provision,
    /// Render the statement only
    DryRun,
}

/// What a run discovered and did
#[derive(Debug, Clone)]
pub struct RunReport {
    pub discovery: Discovery,
    pub statement: String,
    /// `None` in dry-run mode
    pub outcome: Option<ProvisionOutcome>,
}

/// Entry point with pre-loaded, validated configuration
pub async fn run(config: &RuntimeConfig, mode: RunMode) -> Result<RunReport> {
    let conn = config.aws_connection();
    let sdk_config = ct_snapshot_aws::load_sdk_config(&conn).await;

    let lister = ct_snapshot_aws::s3_lister(&sdk_config, &conn);
    let catalog =
        ct_snapshot_aws::glue_athena_catalog(&sdk_config, &conn, config.athena_settings());
    let today = chrono::Local::now().date_naive();

    run_with_clients(config, &lister, catalog, today, mode).await
}

/// Run both phases against the given collaborators.
///
/// `today` is the earliest-date sentinel used when no data is found.
pub async fn run_with_clients<L, C>(
    config: &RuntimeConfig,
    lister: &L,
    catalog: C,
    today: NaiveDate,
    mode: RunMode,
) -> Result<RunReport>
where
    L: PrefixLister + ?Sized,
    C: CatalogClient,
{
    let root = S3Uri::bucket_root(&config.source.bucket);

    let discovery = discover(lister, &root, today)
        .await
        .with_context(|| format!("Failed to discover partitions under {}", root))?;

    info!(begin_date = %discovery.begin_date, "Earliest snapshot date");
    info!(orgs = %discovery.orgs_csv(), "Discovered orgs");
    info!(accounts = %discovery.accounts_csv(), "Discovered accounts");
    info!(regions = %discovery.regions_csv(), "Discovered regions");

    let target = config.table_target();

    let report = match mode {
        RunMode::DryRun => {
            let statement = render_create_table(&target, &discovery)
                .context("Failed to render CREATE TABLE statement")?;
            info!(
                "Dry run: not touching table {}.{}",
                target.database, target.table
            );
            RunReport {
                discovery,
                statement,
                outcome: None,
            }
        }
        RunMode::Provision => {
            let provisioner = TableProvisioner::new(catalog, target);
            let outcome = provisioner
                .provision(&discovery)
                .await
                .context("Failed to provision table")?;
            RunReport {
                discovery,
                statement: outcome.statement.clone(),
                outcome: Some(outcome),
            }
        }
    };

    info!("Finished");
    Ok(report)
}
