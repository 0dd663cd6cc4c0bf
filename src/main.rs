//! Progress Relay - An Ephemeral, Authenticated Key-Value Relay
//!
//! This is the main entry point for the relay server.
//! It loads configuration, starts the sweep scheduler and serves HTTP.

use progress_relay::config::{help_text, Config, Invocation};
use progress_relay::http::{serve, AppState};
use progress_relay::storage::{RelayStore, SweepConfig, SweepScheduler, SystemClock};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match Config::load() {
        Ok(Invocation::Run(config)) => config,
        Ok(Invocation::Help) => {
            println!("{}", help_text());
            return Ok(());
        }
        Ok(Invocation::Version) => {
            println!("Progress Relay version {}", progress_relay::VERSION);
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", help_text());
            std::process::exit(1);
        }
    };

    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    if config.port_from_default {
        info!("Defaulting to port {}", config.port);
    }
    info!(config = ?config, "Progress Relay v{} starting", progress_relay::VERSION);

    // The store is shared by every request handler and the scheduler
    let store = Arc::new(RelayStore::new(config.store_config()));
    let clock = Arc::new(SystemClock);

    let _scheduler = SweepScheduler::start(
        Arc::clone(&store),
        clock.clone(),
        SweepConfig {
            interval: config.sweep_interval,
        },
    );

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("Listening on {}", config.bind_address());

    let state = AppState::new(store, clock);
    if let Err(e) = serve(listener, state, shutdown_signal()).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        // Without a signal handler, run until the process is killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping server...");
}
