//! Engine state and manifest files
//!
//! The external provisioning engine reports what it created in
//! `.dokploy-fleet/state.json`. Declarations handed to the engine are written
//! to `.dokploy-fleet/manifest.json`.

use crate::error::{CloudError, Result};
use crate::output::Outputs;
use crate::resource::ResourceSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;

const STATE_VERSION: u32 = 1;
const MANIFEST_VERSION: u32 = 1;
pub const STATE_DIR: &str = ".dokploy-fleet";
const STATE_FILE: &str = "state.json";
const MANIFEST_FILE: &str = "manifest.json";
const LOCK_FILE: &str = "lock.json";

/// Resources the engine has reported, keyed by logical name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalState {
    /// State file version
    pub version: u32,

    #[serde(default)]
    pub resources: HashMap<String, ResourceState>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            resources: HashMap::new(),
        }
    }
}

impl GlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a resource
    pub fn set_resource(&mut self, name: impl Into<String>, state: ResourceState) {
        self.resources.insert(name.into(), state);
    }

    pub fn get_resource(&self, name: &str) -> Option<&ResourceState> {
        self.resources.get(name)
    }

    /// Attribute of a resource as plain text
    pub fn attribute_text(&self, name: &str, attribute: &str) -> Option<String> {
        let value = self.get_resource(name)?.attributes.get(attribute)?;
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// A single resource as reported by the engine
///
/// Fields the engine adds beyond these (status, timestamps) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    /// Provider-specific resource ID (an OCID for OCI)
    pub id: String,

    pub resource_type: String,

    /// Resource attributes (publicIp, id, ...)
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl ResourceState {
    pub fn new(id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        let id = id.into();
        let mut attributes = HashMap::new();
        attributes.insert("id".to_string(), serde_json::json!(id));
        Self {
            id,
            resource_type: resource_type.into(),
            attributes,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// Everything handed to the external engine in one submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: u32,
    pub generated_at: DateTime<Utc>,

    /// Free-form labels (resource code, tool version, ...)
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    pub resources: ResourceSet,
    pub outputs: Outputs,
}

impl Manifest {
    pub fn new(resources: ResourceSet, outputs: Outputs) -> Self {
        Self {
            version: MANIFEST_VERSION,
            generated_at: Utc::now(),
            metadata: BTreeMap::new(),
            resources,
            outputs,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Reads and writes files under `.dokploy-fleet/`
#[derive(Debug, Clone)]
pub struct StateManager {
    project_root: PathBuf,
}

impl StateManager {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    fn state_dir(&self) -> PathBuf {
        self.project_root.join(STATE_DIR)
    }

    fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.state_dir().join(MANIFEST_FILE)
    }

    fn lock_path(&self) -> PathBuf {
        self.state_dir().join(LOCK_FILE)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the engine state, empty if the engine has not written one yet
    pub async fn load(&self) -> Result<GlobalState> {
        let path = self.state_path();
        if !path.exists() {
            tracing::debug!("State file not found, returning empty state");
            return Ok(GlobalState::new());
        }

        let content = fs::read_to_string(&path).await?;
        let state: GlobalState = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(CloudError::StateError(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!("Loaded state with {} resources", state.resources.len());
        Ok(state)
    }

    pub async fn load_manifest(&self) -> Result<Option<Manifest>> {
        let path = self.manifest_path();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        let manifest: Manifest = serde_json::from_str(&content)?;
        if manifest.version > MANIFEST_VERSION {
            return Err(CloudError::StateError(format!(
                "Manifest version {} is newer than supported version {}",
                manifest.version, MANIFEST_VERSION
            )));
        }
        Ok(Some(manifest))
    }

    pub async fn save_manifest(&self, manifest: &Manifest) -> Result<PathBuf> {
        self.ensure_state_dir().await?;

        let path = self.manifest_path();
        let content = serde_json::to_string_pretty(manifest)?;
        fs::write(&path, content).await?;

        tracing::debug!(
            "Wrote manifest with {} resources to {}",
            manifest.resources.len(),
            path.display()
        );
        Ok(path)
    }

    /// Acquire a lock for exclusive access
    ///
    /// The lock file is published atomically, so two processes cannot both
    /// succeed. An existing lock older than an hour, or one that cannot
    /// be parsed, is treated as abandoned and replaced once.
    pub async fn acquire_lock(&self) -> Result<StateLock> {
        self.ensure_state_dir().await?;

        let lock_path = self.lock_path();
        let lock_info = LockInfo {
            holder: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| "unknown".to_string()),
            acquired_at: Utc::now(),
        };
        let content = serde_json::to_string_pretty(&lock_info)?;

        for _ in 0..2 {
            match create_lock_file(&lock_path, &content).await {
                Ok(()) => {
                    tracing::debug!("Acquired state lock");
                    return Ok(StateLock {
                        lock_path,
                        released: false,
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    self.clear_abandoned_lock(&lock_path).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(CloudError::LockError(format!(
            "{} was recreated by another process",
            lock_path.display()
        )))
    }

    /// Remove an existing lock if it is stale or unreadable, else report the holder
    async fn clear_abandoned_lock(&self, lock_path: &Path) -> Result<()> {
        let content = match fs::read_to_string(lock_path).await {
            Ok(content) => content,
            // Released between our create attempt and this read
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<LockInfo>(&content) {
            Ok(existing) => {
                let age = Utc::now().signed_duration_since(existing.acquired_at);
                if age.num_hours() < 1 {
                    return Err(CloudError::LockError(format!(
                        "State is locked by {} since {}",
                        existing.holder, existing.acquired_at
                    )));
                }
                tracing::warn!("Removing stale lock from {}", existing.holder);
            }
            Err(e) => {
                tracing::warn!("Removing unreadable lock {}: {}", lock_path.display(), e);
            }
        }

        match fs::remove_file(lock_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Publish `content` at `path` only if nothing is there yet
///
/// The content is written to a private temp file first and hard-linked into
/// place, so the lock never exists without its holder information.
async fn create_lock_file(path: &Path, content: &str) -> std::io::Result<()> {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    let tmp = path.with_extension(format!(
        "json.{}-{}.tmp",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    ));

    fs::write(&tmp, content).await?;
    let linked = fs::hard_link(&tmp, path).await;
    if let Err(e) = fs::remove_file(&tmp).await {
        tracing::debug!("Failed to remove {}: {}", tmp.display(), e);
    }
    linked
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    acquired_at: DateTime<Utc>,
}

/// RAII guard for the state lock
pub struct StateLock {
    lock_path: PathBuf,
    released: bool,
}

impl StateLock {
    pub async fn release(mut self) -> Result<()> {
        if !self.released {
            if self.lock_path.exists() {
                fs::remove_file(&self.lock_path).await?;
                tracing::debug!("Released state lock");
            }
            self.released = true;
        }
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released && self.lock_path.exists() {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
