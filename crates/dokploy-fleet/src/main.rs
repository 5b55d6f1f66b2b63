mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dokploy-fleet")]
#[command(about = "Dokploy on Docker Swarm, planned for Oracle Cloud", long_about = None)]
struct Cli {
    /// Stack file (otherwise DOKPLOY_FLEET_CONFIG, then the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the stack configuration and print a summary
    Validate,
    /// Show what would be declared
    Preview {
        /// Reuse a resource code instead of generating one
        #[arg(short, long)]
        resource_code: Option<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Hand the declarations to the provisioning engine
    Up {
        /// Reuse a resource code instead of generating one
        #[arg(short, long)]
        resource_code: Option<String>,
        /// Write without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Show stack outputs reported by the engine
    Outputs {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show version information
    Version,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries plan output; logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let project_root = std::env::current_dir()?;
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Validate => commands::validate::handle(config)?,
        Commands::Preview {
            resource_code,
            format,
        } => {
            commands::preview::handle(config, &project_root, resource_code, format).await?;
        }
        Commands::Up { resource_code, yes } => {
            commands::up::handle(config, &project_root, resource_code, yes).await?;
        }
        Commands::Outputs { json } => commands::outputs::handle(&project_root, json).await?,
        Commands::Version => {
            println!("dokploy-fleet {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
