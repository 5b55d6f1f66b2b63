use colored::Colorize;
use dokploy_fleet_cloud::{ManifestEngine, ProvisioningEngine};
use std::path::Path;

pub async fn handle(
    config: Option<&Path>,
    project_root: &Path,
    resource_code: Option<String>,
    yes: bool,
) -> anyhow::Result<()> {
    println!("{}", "Planning fleet...".blue().bold());

    let plan = super::build_plan(config, project_root, resource_code).await?;
    let manifest = plan.to_manifest()?;
    let engine = ManifestEngine::new(project_root);
    let actions = engine.preview(&manifest.resources).await?;

    println!(
        "Resource code: {}",
        plan.resource_code.as_str().cyan().bold()
    );
    println!("Nodes: 1 main, {} worker(s)", plan.workers.len());
    println!("{}", actions.summary());

    if !yes {
        println!();
        println!(
            "{}",
            format!("Would write {}", engine.manifest_path().display()).yellow()
        );
        println!("Run again with --yes to write it");
        return Ok(());
    }

    let result = match engine.submit(&actions, &manifest).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ Submission failed".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    println!();
    for action in &result.accepted {
        println!("  ✓ {}", action.message);
    }

    println!();
    println!(
        "{} {}",
        "✓ Manifest written to".green().bold(),
        engine.manifest_path().display().to_string().cyan()
    );
    println!(
        "Once the engine reports state, run {} to read the outputs",
        "dokploy-fleet outputs".cyan()
    );
    Ok(())
}
