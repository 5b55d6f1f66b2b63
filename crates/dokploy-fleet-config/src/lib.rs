//! Stack configuration for dokploy-fleet
//!
//! Finds the stack file, overlays environment variables and resolves the
//! result into a validated [`FleetConfig`].

pub mod error;
pub mod resolve;
pub mod stack;

pub use error::*;
pub use resolve::{
    DEFAULTS, FleetConfig, KNOWN_KEYS, MAX_WORKER_INSTANCES, REQUIRED_KEYS, default_for, keys,
    resolve,
};
pub use stack::{ENV_PREFIX, RawConfig, env_var_name};

use std::path::{Path, PathBuf};

/// Environment variable pointing directly at a stack file
pub const CONFIG_PATH_ENV: &str = "DOKPLOY_FLEET_CONFIG";

const STACK_DIR: &str = ".dokploy-fleet";
const CANDIDATES: [&str; 4] = [
    "fleet.local.yaml",
    ".fleet.local.yaml",
    "fleet.yaml",
    ".fleet.yaml",
];

/// Find the stack file
///
/// Search order:
/// 1. `DOKPLOY_FLEET_CONFIG`
/// 2. current directory: fleet.local.yaml, .fleet.local.yaml, fleet.yaml, .fleet.yaml
/// 3. the same names under `./.dokploy-fleet/`
/// 4. `~/.config/dokploy-fleet/fleet.yaml`
pub fn find_stack_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::debug!("{} points at a missing file: {}", CONFIG_PATH_ENV, path.display());
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let stack_dir = current_dir.join(STACK_DIR);
    if stack_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = stack_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("dokploy-fleet").join("fleet.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::StackFileNotFound)
}

/// Load and resolve the fleet configuration
///
/// Uses `path` when given, otherwise [`find_stack_file`]. Returns the stack
/// file that was read together with the resolved configuration.
pub fn load_fleet_config(path: Option<&Path>) -> Result<(PathBuf, FleetConfig)> {
    let stack_file = match path {
        Some(p) => p.to_path_buf(),
        None => find_stack_file()?,
    };

    let mut raw = RawConfig::load(&stack_file)?;
    raw.apply_env_overrides();
    let config = FleetConfig::resolve(&raw)?;

    Ok((stack_file, config))
}
