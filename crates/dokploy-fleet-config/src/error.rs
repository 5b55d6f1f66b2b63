use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Stack file not found. Looked in:\n\
        - current directory: fleet.local.yaml, .fleet.local.yaml, fleet.yaml, .fleet.yaml\n\
        - ./.dokploy-fleet/ directory\n\
        - ~/.config/dokploy-fleet/fleet.yaml\n\
        Set DOKPLOY_FLEET_CONFIG to point at a stack file directly"
    )]
    StackFileNotFound,

    #[error("Missing required configuration key(s): {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    #[error("Invalid value for '{key}': {value:?} ({reason})")]
    InvalidNumber {
        key: String,
        value: String,
        reason: &'static str,
    },

    #[error(
        "Unsupported value for '{key}' in {}: only strings, numbers and booleans are allowed",
        path.display()
    )]
    UnsupportedValue { key: String, path: PathBuf },

    #[error("Failed to parse stack file {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
