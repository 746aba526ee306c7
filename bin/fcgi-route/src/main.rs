use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fcgi_core::{Generations, RegistryConfig, ServerRegistry, SystemResolver, WrapperIdentity};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod lookup;

use lookup::{describe_server, Lookup};

#[derive(Parser)]
#[command(name = "fcgi-route")]
#[command(about = "Check FastCGI server configuration and path routing", long_about = None)]
struct Cli {
    /// Server configuration file
    #[arg(short, long, default_value = "/etc/fcgi-route/servers.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the configuration and list registered servers
    Check,
    /// Show which server each request path routes to
    Lookup {
        #[arg(required = true)]
        paths: Vec<String>,

        /// Requesting uid (wrapper mode)
        #[arg(long, requires = "gid")]
        uid: Option<u32>,

        /// Requesting gid (wrapper mode)
        #[arg(long, requires = "uid")]
        gid: Option<u32>,

        /// Print one JSON object per path
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Hostname resolution blocks, keep it off the runtime threads
    let config_path = cli.config.clone();
    let (config, registry) = tokio::task::spawn_blocking(move || load_generation(&config_path))
        .await
        .context("configuration loader task failed")??;

    let generations = Generations::new();
    let generation = generations.publish(registry);
    info!(generation, "Server registry ready");

    match cli.command {
        Commands::Check => {
            let registry = generations.current();
            for server in registry.iter() {
                println!("{}", describe_server(server));
            }
            println!("{} servers", registry.len());
        }
        Commands::Lookup {
            paths,
            uid,
            gid,
            json,
        } => {
            let mut identity = uid.zip(gid).map(|(uid, gid)| WrapperIdentity::new(uid, gid));
            if identity.is_some() && !config.wrapper {
                warn!("Wrapper is disabled in the configuration; ignoring --uid/--gid");
                identity = None;
            }

            let lookup = Lookup::new(generations.current(), identity);
            for path in &paths {
                if json {
                    println!("{}", lookup.to_json(path));
                } else {
                    println!("{}", lookup.describe(path));
                }
            }
        }
    }

    Ok(())
}

fn load_generation(path: &Path) -> Result<(RegistryConfig, ServerRegistry)> {
    let config = RegistryConfig::load(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let registry = config
        .build_registry(&SystemResolver)
        .context("invalid server configuration")?;
    Ok((config, registry))
}
