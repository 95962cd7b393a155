use std::process;
use std::sync::Arc;

use log::*;
use service::{config::Config, logging::Logger};
use tokio::signal;

use domain::{oauth_flow, PendingStateCache, StateSweeper};

#[tokio::main]
async fn main() {
    let config = Config::new();

    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
        process::exit(1);
    }

    info!(
        "Starting OAuth relay [{}] with log level: {}",
        config.runtime_env(),
        config.log_level_filter
    );

    let provider = match oauth_flow::google_provider(&config) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            error!("Failed to configure identity provider: {e}");
            process::exit(1);
        }
    };

    let state_ttl = match chrono::Duration::from_std(config.state_ttl()) {
        Ok(ttl) => ttl,
        Err(e) => {
            error!("Invalid state TTL of {}s: {e}", config.state_ttl_secs);
            process::exit(1);
        }
    };
    let state_cache = PendingStateCache::with_ttl(state_ttl);

    let mut sweeper = StateSweeper::new(state_cache.clone(), config.state_sweep_interval());
    if let Err(e) = sweeper.start() {
        error!("Failed to start OAuth state sweeper: {e}");
        process::exit(1);
    }

    let app_state = web::AppState::new(config, state_cache, provider);

    let served = web::init_server(app_state, shutdown_signal()).await;

    if let Err(e) = sweeper.stop().await {
        warn!("OAuth state sweeper did not stop cleanly: {e}");
    }

    if let Err(e) = served {
        error!("Server failed: {e}");
        process::exit(1);
    }

    info!("OAuth relay stopped");
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down gracefully..."),
        Err(e) => error!("Failed to listen for shutdown signal: {e}"),
    }
}
