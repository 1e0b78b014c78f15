use anyhow::{Context, Result};
use clap::Parser;
use ct_snapshot_table::cli::Cli;
use ct_snapshot_table::{init_tracing, run, RunMode, RuntimeConfig};
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Step 1: Load base configuration (defaults, file, environment)
    let mut config =
        RuntimeConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Step 2: Apply CLI overrides (highest priority)
    cli.apply_overrides(&mut config);

    // Step 3: Initialize tracing early so validation logs show up
    init_tracing(&config);

    info!(
        s3_source_bucket = %config.source.bucket,
        database_name = %config.catalog.database,
        table_name = %config.catalog.table,
        workgroup = %config.catalog.workgroup,
        dry_run = cli.dry_run,
        "ct-snapshot-table v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Step 4: Validate
    config.validate()?;

    let mode = if cli.dry_run {
        RunMode::DryRun
    } else {
        RunMode::Provision
    };

    // Discovery and provisioning are sequential; one thread is enough
    let report = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(run(&config, mode))?;

    if mode == RunMode::DryRun {
        println!("{}", report.statement);
    }

    Ok(())
}
