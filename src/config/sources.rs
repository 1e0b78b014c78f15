// Configuration source loading.
//
// Priority order (highest first):
// 1. Environment variables (CT_SNAPSHOT_* prefix)
// 2. Explicit file path (--config), else CT_SNAPSHOT_CONFIG
// 3. Default config file (./ct-snapshot.toml)
// 4. Built-in defaults

use super::env_overrides::{self, EnvSource, ENV_PREFIX};
use super::RuntimeConfig;
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "./ct-snapshot.toml";

pub fn load_config<E: EnvSource>(explicit: Option<&Path>, env: &E) -> Result<RuntimeConfig> {
    let mut config = RuntimeConfig::default();

    if let Some(file_config) = load_from_file(explicit, env)? {
        config.merge(file_config);
    }

    env_overrides::apply_env_overrides(&mut config, env)?;
    Ok(config)
}

fn load_from_file<E: EnvSource>(explicit: Option<&Path>, env: &E) -> Result<Option<RuntimeConfig>> {
    let path = match (explicit, env.get("CONFIG")) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(path)) => PathBuf::from(path),
        (None, None) => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return Ok(None);
            }
            default.to_path_buf()
        }
    };

    debug!("Loading configuration from {}", path.display());

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config = RuntimeConfig::from_toml(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(Some(config))
}

/// Reads `CT_SNAPSHOT_*` variables from the process environment
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }
}
