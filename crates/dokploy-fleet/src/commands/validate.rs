use super::load_config;
use colored::Colorize;
use dokploy_fleet_cloud_oci::StartupScripts;
use std::path::Path;

pub fn handle(config: Option<&Path>) -> anyhow::Result<()> {
    println!("{}", "Validating stack configuration...".blue());

    let (stack_file, config) = load_config(config);
    println!("Stack file: {}", stack_file.display().to_string().cyan());

    if let Err(e) = StartupScripts::for_config(&config) {
        eprintln!();
        eprintln!("{}", "✗ Startup script error".red().bold());
        eprintln!("  {}", e);
        std::process::exit(1);
    }

    println!("{}", "✓ Configuration is valid".green().bold());
    println!();
    println!("Summary:");
    println!("  Compartment: {}", config.compartment_id.cyan());
    println!("  Image: {}", config.source_image_id.cyan());
    println!(
        "  Shape: {} ({} OCPU, {} GB)",
        config.instance_shape.cyan(),
        config.ocpus,
        config.memory_in_gbs
    );
    println!("  Main node: {}", config.availability_domain_main);
    println!(
        "  Workers: {} in {}",
        config.num_worker_instances, config.availability_domain_workers
    );
    println!(
        "  Startup scripts: {}, {}",
        config.main_startup_script.display(),
        config.worker_startup_script.display()
    );

    Ok(())
}
