//! CLI configuration utilities

use anyhow::Result;
use eva_core::{ClientConfig, StateDir};
use std::path::Path;
use tracing::debug;

/// Command-line values that take precedence over the config file and environment
#[derive(Debug, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Load client configuration
///
/// An explicit `path` must exist. Without one, `<config dir>/eva.toml` is used
/// when present.
pub fn load_client_config(
    path: Option<&Path>,
    state_dir: &StateDir,
    overrides: Overrides,
) -> Result<ClientConfig> {
    let default_path = state_dir.config_path();
    let path = path.or_else(|| default_path.exists().then_some(default_path.as_path()));
    if let Some(path) = path {
        debug!("Loading configuration from {}", path.display());
    }

    let mut config = ClientConfig::load(path)?;
    if let Some(base_url) = overrides.base_url {
        config.base_url = base_url;
    }
    if let Some(timeout_secs) = overrides.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    Ok(config)
}
