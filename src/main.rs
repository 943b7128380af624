//! Syrup Cache server binary
//!
//! Loads configuration from the environment, starts the cache's background
//! tasks and serves the HTTP API until SIGINT/SIGTERM.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use syrup_cache::api::create_router;
use syrup_cache::{AppState, CacheTasks, Config};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Create cache store with configured parameters
/// 4. Start background eviction and alert tasks
/// 5. Serve the Axum router on the configured port
/// 6. On shutdown, stop the background tasks before exiting
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "syrup_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Syrup Cache Server");

    let config = Config::from_env();
    config
        .cache
        .validate()
        .context("Invalid cache configuration")?;
    info!(
        "Configuration loaded: max_cache_size={}, eviction_policy={:?}, default_ttl={}ms, evict_interval={}ms, port={}",
        config.cache.max_cache_size,
        config.cache.eviction_policy,
        config.cache.default_ttl_ms,
        config.cache.evict_interval_ms,
        config.server_port
    );

    let state = AppState::from_config(&config).context("Failed to create cache store")?;
    info!("Cache store initialized");

    let tasks = CacheTasks::start(state.cache.clone(), &config.cache);
    info!("Background eviction and alert tasks started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    tasks.shutdown().await;
    served.context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
