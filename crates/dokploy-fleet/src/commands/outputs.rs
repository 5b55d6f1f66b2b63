use colored::Colorize;
use dokploy_fleet_cloud::{ManifestEngine, ProvisioningEngine};
use std::path::Path;

pub async fn handle(project_root: &Path, json: bool) -> anyhow::Result<()> {
    let engine = ManifestEngine::new(project_root);

    let Some(manifest) = engine.state_manager().load_manifest().await? else {
        eprintln!("{}", "✗ No manifest found".red().bold());
        eprintln!("  Run {} first", "dokploy-fleet up --yes".cyan());
        std::process::exit(1);
    };

    let state = engine.state().await?;
    let resolved = manifest.outputs.resolve(&state)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    for (name, value) in &resolved {
        println!("{}: {}", name.bold(), value);
    }
    Ok(())
}
