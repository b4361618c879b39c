//! hivecache node binary
//!
//! Serves one slice of a distributed cache tier: the inter-node protocol
//! plus health and statistics endpoints, fronting a directory-backed
//! origin.

mod cache;
mod config;
mod error;
mod group;
mod http;
mod models;
mod peers;
mod ring;
mod singleflight;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use error::{CacheError, Result};
use group::{new_group, Getter};
use http::{create_router, HttpPool};

/// Origin loader reading values from files under a directory.
///
/// A key maps to the file `<dir>/<key>`; a missing or unreadable file is a
/// loader failure. Keys naming other directories are rejected.
struct FileOrigin {
    dir: PathBuf,
}

#[async_trait]
impl Getter for FileOrigin {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        if key.contains('/') || key.contains("..") {
            return Err(CacheError::Loader(format!("invalid origin key: {key}")));
        }
        let path = self.dir.join(key);
        tokio::fs::read(&path)
            .await
            .map_err(|err| CacheError::Loader(format!("{}: {err}", path.display())))
    }
}

/// Main entry point for a hivecache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the peer pool and hash ring over the configured peer set
/// 4. Register the cache group backed by the directory origin
/// 5. Create the axum router and start the HTTP server
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hivecache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting hivecache node");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_bytes={}, port={}, self={}, peers={}, replicas={}",
        config.cache_bytes,
        config.server_port,
        config.self_url,
        config.peers.len(),
        config.replicas
    );

    // Build the peer pool over the configured cluster
    let pool = Arc::new(
        HttpPool::with_config(&config.self_url, &config.base_path, config.replicas)
            .expect("failed to build peer pool"),
    );
    pool.set_peers(config.peers.clone());

    // Register the cache group fronting the directory origin
    let origin = Arc::new(FileOrigin {
        dir: PathBuf::from(&config.origin_dir),
    });
    let cache_group = new_group(&config.group_name, config.cache_bytes, origin);
    cache_group.register_peers(pool.clone());
    info!(
        group = config.group_name.as_str(),
        origin = config.origin_dir.as_str(),
        "cache group registered"
    );

    // Create router with all endpoints
    let app = create_router(pool);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    info!("Node listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    info!("Node shutdown complete");
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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
