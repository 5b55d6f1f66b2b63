use crate::Format;
use colored::Colorize;
use dokploy_fleet_cloud::{ActionType, ManifestEngine, ProvisioningEngine};
use std::path::Path;

pub async fn handle(
    config: Option<&Path>,
    project_root: &Path,
    resource_code: Option<String>,
    format: Format,
) -> anyhow::Result<()> {
    let plan = super::build_plan(config, project_root, resource_code).await?;
    let resources = plan.to_resource_set()?;

    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&resources)?);
            return Ok(());
        }
        Format::Yaml => {
            print!("{}", serde_yaml::to_string(&resources)?);
            return Ok(());
        }
        Format::Text => {}
    }

    let engine = ManifestEngine::new(project_root);
    let actions = engine.preview(&resources).await?;

    println!(
        "{} {}",
        "Fleet".bold(),
        plan.resource_code.as_str().cyan().bold()
    );
    println!();
    for action in &actions.actions {
        let marker = match action.action_type {
            ActionType::Create => "+".green(),
            ActionType::NoOp => " ".normal(),
        };
        println!(
            "  {} {} ({})",
            marker,
            action.resource_name,
            action.resource_type.dimmed()
        );
    }

    println!();
    println!("Open ports:");
    for (protocol, port) in plan.security_list.open_ports() {
        println!("  {}/{}", port, protocol);
    }

    println!();
    println!("{}", actions.summary().to_string().bold());
    Ok(())
}
