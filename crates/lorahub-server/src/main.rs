use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lorahub_server::{AppState, router};

#[derive(Parser, Debug)]
#[command(name = "lorahub", version, about = "Multi-network LPWAN management server")]
struct Args {
    /// Path to the configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run(Args::parse()).await {
        tracing::error!(%err, "server failed");
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let path = args.config.unwrap_or_else(lorahub_config::config_path);
    let config = lorahub_config::load_config(&path)?;
    info!(config = %path.display(), networks = config.networks.len(), "configuration loaded");

    let state = Arc::new(AppState::from_config(&config).await?);

    // Verify connectivity up front; a failing network stays registered
    // and can still be synced later once it recovers.
    for entry in state.networks.values() {
        if !entry.network.enabled {
            info!(network = %entry.network.name, "network disabled, skipping connection check");
            continue;
        }
        if let Err(err) = state
            .handler
            .connect(&entry.network, entry.client.as_ref())
            .await
        {
            warn!(network = %entry.network.name, %err, "initial connection failed");
        }
    }

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(bind = %config.server.bind, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
