// ============================================================================
// gotweet-server - POST a request body, get a tweet
// ============================================================================
// Usage:
//   gotweet-server [--host ADDR] [--port PORT] [--tokens-path PATH]
//
// Tokens are read from ~/.gotweet-server, or from TWITTER_CONSUMER_KEY,
// TWITTER_CONSUMER_SECRET, TWITTER_ACCESS_TOKEN and
// TWITTER_ACCESS_TOKEN_SECRET when that file does not exist. They are
// written back to the file on every successful start.
// ============================================================================

mod config;
mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gotweet_core::{Relay, TwitterExecutor};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::server::{exit_process, RelayServer};

const DEFAULT_LOG_FILTER: &str = "gotweet_server=info,gotweet_core=info";

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Could not load .env file: {}", e);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    if let Err(e) = run(ServerConfig::parse()).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: ServerConfig) -> Result<()> {
    let store = config.token_store()?;
    let tokens = store
        .resolve()
        .with_context(|| format!("Failed to resolve tokens ({})", store.path().display()))?;

    // Flush state to disk
    store
        .persist(&tokens)
        .with_context(|| format!("Failed to save tokens to {}", store.path().display()))?;

    let relay = Relay::new(Arc::new(TwitterExecutor::new(&tokens)));
    let server = RelayServer::bind(&config.listen_addr(), relay)?.with_fatal_hook(exit_process());
    let shutdown = server.shutdown_handle();

    match server.local_addr() {
        Some(addr) => info!("Serving traffic on {}", addr),
        None => info!("Serving traffic on port {}", config.port),
    }
    let server = Arc::new(server);
    let serving = tokio::task::spawn_blocking(move || server.run());

    tokio::select! {
        joined = serving => joined.context("Relay server thread panicked")?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            info!("Shutdown signal received");
            shutdown.shutdown();
        }
    }

    Ok(())
}
