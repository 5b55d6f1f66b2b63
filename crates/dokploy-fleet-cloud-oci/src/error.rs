//! OCI fleet plan error types

use crate::startup_scripts::NodeRole;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OciError {
    #[error("Invalid resource code {0:?}: expected 6 lowercase letters or digits")]
    InvalidResourceCode(String),

    #[error("Invalid CIDR block {cidr:?}: {reason}")]
    InvalidCidr { cidr: String, reason: &'static str },

    #[error("Invalid network layout: {0}")]
    InvalidNetwork(String),

    #[error("Invalid port range {min}-{max}")]
    InvalidPortRange { min: u16, max: u16 },

    #[error("{role} startup script not found: {}", path.display())]
    StartupScriptNotFound { role: NodeRole, path: PathBuf },

    #[error("No {0} startup script loaded")]
    MissingStartupScript(NodeRole),

    #[error("Invalid startup payload: {0}")]
    InvalidPayload(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Cloud error: {0}")]
    CloudError(#[from] dokploy_fleet_cloud::CloudError),
}

pub type Result<T> = std::result::Result<T, OciError>;
