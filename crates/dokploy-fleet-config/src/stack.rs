//! Stack file parsing
//!
//! A stack file uses the Pulumi stack layout. Keys may carry a namespace
//! prefix, which is dropped:
//!
//! ```yaml
//! config:
//!   dokploy:compartmentId: ocid1.compartment.oc1..aaaa
//!   dokploy:numWorkerInstances: 2
//! ```

use crate::error::{ConfigError, Result};
use crate::resolve::KNOWN_KEYS;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Prefix of environment variables that override stack values
pub const ENV_PREFIX: &str = "DOKPLOY_";

#[derive(Debug, Deserialize)]
struct StackFile {
    #[serde(default)]
    config: Option<BTreeMap<String, serde_yaml::Value>>,
}

/// Unresolved configuration values, keyed by bare key name
#[derive(Debug, Clone, Default)]
pub struct RawConfig {
    values: BTreeMap<String, String>,

    /// Directory relative paths are resolved against
    base_dir: Option<PathBuf>,
}

impl RawConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse a stack file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut raw = Self::from_yaml_str(&content, path)?;
        raw.base_dir = path.parent().map(Path::to_path_buf);
        tracing::debug!("Loaded {} keys from {}", raw.values.len(), path.display());
        Ok(raw)
    }

    /// Parse stack file content. `path` is only used in error messages.
    pub fn from_yaml_str(content: &str, path: &Path) -> Result<Self> {
        let mut raw = Self::new();
        if content.trim().is_empty() {
            return Ok(raw);
        }

        let stack: StackFile = serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

        for (key, value) in stack.config.unwrap_or_default() {
            let bare = strip_namespace(&key);
            let text = scalar_to_string(&value).ok_or_else(|| ConfigError::UnsupportedValue {
                key: bare.to_string(),
                path: path.to_path_buf(),
            })?;
            raw.values.insert(bare.to_string(), text);
        }

        Ok(raw)
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay `DOKPLOY_*` environment variables for every known key
    pub fn apply_env_overrides(&mut self) {
        for key in KNOWN_KEYS {
            if let Ok(value) = std::env::var(env_var_name(key)) {
                tracing::debug!("Overriding {} from environment", key);
                self.values.insert((*key).to_string(), value);
            }
        }
    }
}

/// Environment variable name for a config key
///
/// `numWorkerInstances` becomes `DOKPLOY_NUM_WORKER_INSTANCES`.
pub fn env_var_name(key: &str) -> String {
    let mut name = String::from(ENV_PREFIX);
    for (i, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            name.push('_');
        }
        name.push(c.to_ascii_uppercase());
    }
    name
}

fn strip_namespace(key: &str) -> &str {
    key.rsplit_once(':').map(|(_, bare)| bare).unwrap_or(key)
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
