//! Provisioning engine seam
//!
//! Creating resources is the job of an external engine. Implementations of
//! [`ProvisioningEngine`] decide how declarations reach it.

use crate::action::{Action, ActionType, ApplyResult, Plan};
use crate::error::Result;
use crate::resource::ResourceSet;
use crate::state::{GlobalState, Manifest, StateManager};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[async_trait]
pub trait ProvisioningEngine: Send + Sync {
    /// What the engine currently reports
    async fn state(&self) -> Result<GlobalState>;

    /// Compare declarations with what the engine already reports
    async fn preview(&self, desired: &ResourceSet) -> Result<Plan>;

    /// Hand the declarations to the engine
    async fn submit(&self, plan: &Plan, manifest: &Manifest) -> Result<ApplyResult>;
}

/// Writes declarations to `.dokploy-fleet/manifest.json` for an external
/// engine and reads its results back from `.dokploy-fleet/state.json`
pub struct ManifestEngine {
    state: StateManager,
}

impl ManifestEngine {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            state: StateManager::new(project_root),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.state.manifest_path()
    }

    pub fn state_manager(&self) -> &StateManager {
        &self.state
    }
}

#[async_trait]
impl ProvisioningEngine for ManifestEngine {
    async fn state(&self) -> Result<GlobalState> {
        self.state.load().await
    }

    async fn preview(&self, desired: &ResourceSet) -> Result<Plan> {
        desired.validate_dependencies()?;
        let current = self.state.load().await?;

        let actions = desired
            .iter()
            .map(|resource| match current.get_resource(&resource.name) {
                Some(_) => Action::no_op(&resource.resource_type, &resource.name),
                None => Action::create(&resource.resource_type, &resource.name),
            })
            .collect();

        Ok(Plan::new(actions))
    }

    async fn submit(&self, plan: &Plan, manifest: &Manifest) -> Result<ApplyResult> {
        let start = std::time::Instant::now();
        manifest.resources.validate_dependencies()?;

        let lock = self.state.acquire_lock().await?;
        let written = self.state.save_manifest(manifest).await;
        lock.release().await?;
        let path = written?;

        let mut result = ApplyResult::new();
        for action in &plan.actions {
            match action.action_type {
                ActionType::Create => {
                    tracing::info!("Declared {} ({})", action.resource_name, action.resource_type);
                    result.add_accepted(
                        action.id.clone(),
                        format!("{} written to {}", action.resource_name, path.display()),
                    );
                }
                ActionType::NoOp => {}
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }
}
