use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use roster::config::Config;
use roster::error::Result;
use roster::server;

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Read-only, filterable, paginated API over a Parquet user dataset")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = match cli.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    info!(
        "Starting Roster server on {}:{}",
        config.server.host, config.server.port
    );
    info!("Dataset: {}", config.dataset.path);

    // Start the server
    if let Err(e) = server::start(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
