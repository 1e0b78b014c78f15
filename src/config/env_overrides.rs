use super::{LogFormat, RuntimeConfig};
use anyhow::{anyhow, Result};

pub const ENV_PREFIX: &str = "CT_SNAPSHOT_";

/// Abstraction over environment-variable lookups so tests can supply their own
/// source of overrides. `key` is given without the `CT_SNAPSHOT_` prefix.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Source bucket
    if let Some(bucket) = get_env_string(env, "SOURCE_BUCKET") {
        config.source.bucket = bucket;
    }

    // Target table
    if let Some(database) = get_env_string(env, "DATABASE_NAME") {
        config.catalog.database = database;
    }
    if let Some(table) = get_env_string(env, "TABLE_NAME") {
        config.catalog.table = table;
    }

    // Athena execution
    if let Some(workgroup) = get_env_string(env, "WORKGROUP") {
        config.catalog.workgroup = workgroup;
    }
    if let Some(location) = get_env_string(env, "OUTPUT_LOCATION") {
        config.catalog.output_location = non_empty(location);
    }
    if let Some(val) = get_env_u64(env, "POLL_INTERVAL_MS")? {
        config.catalog.poll_interval_ms = val;
    }

    // AWS connection
    if let Some(region) = get_env_string(env, "REGION") {
        config.aws.region = non_empty(region);
    }
    if let Some(endpoint) = get_env_string(env, "ENDPOINT_URL") {
        config.aws.endpoint_url = non_empty(endpoint);
    }

    // Logging
    if let Some(level) = get_env_string(env, "LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT") {
        config.logging.format = format
            .parse::<LogFormat>()
            .map_err(|e| anyhow!("Invalid {}LOG_FORMAT value: {}", ENV_PREFIX, e))?;
    }

    Ok(())
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key)
}

fn get_env_u64<E: EnvSource>(env: &E, key: &str) -> Result<Option<u64>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = val
                .parse::<u64>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
