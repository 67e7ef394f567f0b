//! Group Cache - A distributed read-through cache node
//!
//! Serves one demo group and joins the peers named in the configuration.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use group_cache::api::create_router;
use group_cache::{AppState, Config, HttpPool, LoaderFn, Registry};

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the demo `scores` group backed by an in-memory table
/// 4. Register the HTTP peer pool with the group
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "group_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Group Cache node");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_bytes={}, port={}, self_addr={}, peers={:?}",
        config.cache_bytes, config.server_port, config.self_addr, config.peers
    );

    let registry = Registry::new();
    let db: HashMap<&'static str, &'static str> =
        HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]);
    let scores = registry.create_group(
        "scores",
        config.cache_bytes,
        LoaderFn::new(move |key: &str| {
            info!("[SlowDB] search key {}", key);
            db.get(key)
                .map(|value| value.as_bytes().to_vec())
                .ok_or_else(|| anyhow::anyhow!("{} not exist", key))
        }),
    );

    let pool = Arc::new(HttpPool::new(config.self_addr.clone(), &config.base_path));
    pool.set_peers(config.peer_list());
    scores.register_peers(pool);

    let app = create_router(AppState::new(registry), &config.base_path);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
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
