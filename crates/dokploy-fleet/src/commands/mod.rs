pub mod outputs;
pub mod preview;
pub mod up;
pub mod validate;

use colored::Colorize;
use dokploy_fleet_cloud::StateManager;
use dokploy_fleet_cloud_oci::{FleetPlan, ResourceCode, StartupScripts};
use dokploy_fleet_config::FleetConfig;
use std::path::{Path, PathBuf};

/// Load the stack configuration or exit with a readable error
pub fn load_config(path: Option<&Path>) -> (PathBuf, FleetConfig) {
    match dokploy_fleet_config::load_fleet_config(path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", "✗ Configuration error".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}

/// Pick the resource code: `--resource-code`, then the code recorded in an
/// earlier manifest, then a fresh one
pub async fn resource_code(
    explicit: Option<String>,
    project_root: &Path,
) -> anyhow::Result<ResourceCode> {
    if let Some(code) = explicit {
        return Ok(ResourceCode::parse(&code)?);
    }

    let manifest = StateManager::new(project_root).load_manifest().await?;
    if let Some(code) = manifest
        .as_ref()
        .and_then(|m| m.metadata.get("resourceCode"))
    {
        tracing::debug!("Reusing resource code {} from manifest", code);
        return Ok(ResourceCode::parse(code)?);
    }

    Ok(ResourceCode::generate())
}

/// Build the plan for the current stack
pub async fn build_plan(
    config: Option<&Path>,
    project_root: &Path,
    code: Option<String>,
) -> anyhow::Result<FleetPlan> {
    let (_, config) = load_config(config);
    let scripts = StartupScripts::for_config(&config)?;
    let code = resource_code(code, project_root).await?;
    Ok(FleetPlan::build(&config, &scripts, code)?)
}
