//! Role-specific startup scripts
//!
//! The main node runs the Dokploy installer and initialises the swarm; worker
//! nodes run the join script. Script contents are opaque here: the bytes on
//! disk are what the node receives. They are base64 encoded only when the
//! declaration is serialized, since OCI `user_data` must be base64.

use crate::error::{OciError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use dokploy_fleet_config::FleetConfig;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Main,
    Worker,
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeRole::Main => write!(f, "main"),
            NodeRole::Worker => write!(f, "worker"),
        }
    }
}

/// Exact bytes delivered to a node at first boot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupPayload(Vec<u8>);

impl StartupPayload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_base64(encoded: &str) -> Result<Self> {
        STANDARD
            .decode(encoded)
            .map(Self)
            .map_err(|e| OciError::InvalidPayload(e.to_string()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }
}

impl Serialize for StartupPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for StartupPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::from_base64(&encoded).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupScript {
    pub role: NodeRole,

    /// Where the script was read from, if it came from disk
    pub path: Option<PathBuf>,

    pub payload: StartupPayload,
}

impl StartupScript {
    pub fn load(role: NodeRole, path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => OciError::StartupScriptNotFound {
                role,
                path: path.to_path_buf(),
            },
            _ => OciError::IoError(e),
        })?;

        tracing::debug!("Loaded {} startup script ({} bytes) from {}", role, bytes.len(), path.display());
        Ok(Self {
            role,
            path: Some(path.to_path_buf()),
            payload: StartupPayload::new(bytes),
        })
    }

    pub fn from_bytes(role: NodeRole, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            role,
            path: None,
            payload: StartupPayload::new(bytes),
        }
    }
}

/// Scripts for both roles
///
/// The worker script is optional so a fleet without workers does not need one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupScripts {
    main: StartupScript,
    worker: Option<StartupScript>,
}

impl StartupScripts {
    pub fn new(main: StartupScript, worker: Option<StartupScript>) -> Self {
        Self { main, worker }
    }

    pub fn from_bytes(main: impl Into<Vec<u8>>, worker: impl Into<Vec<u8>>) -> Self {
        Self {
            main: StartupScript::from_bytes(NodeRole::Main, main),
            worker: Some(StartupScript::from_bytes(NodeRole::Worker, worker)),
        }
    }

    /// Read the scripts a configuration needs
    pub fn for_config(config: &FleetConfig) -> Result<Self> {
        let main = StartupScript::load(NodeRole::Main, &config.main_startup_script)?;
        let worker = if config.num_worker_instances > 0 {
            Some(StartupScript::load(
                NodeRole::Worker,
                &config.worker_startup_script,
            )?)
        } else {
            None
        };
        Ok(Self { main, worker })
    }

    pub fn get(&self, role: NodeRole) -> Option<&StartupScript> {
        match role {
            NodeRole::Main => Some(&self.main),
            NodeRole::Worker => self.worker.as_ref(),
        }
    }

    pub fn payload(&self, role: NodeRole) -> Result<&StartupPayload> {
        self.get(role)
            .map(|script| &script.payload)
            .ok_or(OciError::MissingStartupScript(role))
    }
}
