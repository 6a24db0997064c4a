use anyhow::Result;
use clap::Parser;
use questforge_server::models::Config;
use questforge_server::server::{self, AppState};
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "questforge-server")]
#[command(about = "Backend for a choose-your-own-adventure game")]
struct CliArgs {
    /// Override the configured bind address.
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "questforge_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting questforge-server");

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let addr = args.bind.unwrap_or(config.bind_addr);
    let state = AppState::from_config(config);

    if let Err(e) = server::serve(state, addr).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
