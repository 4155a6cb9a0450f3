mod annotate;
mod config;
mod editing;
mod errors;
mod export;
mod layout;
mod models;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::editing::ResumeSession;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{MemorySnapshotStore, RedisSnapshotStore, SnapshotStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    // Snapshot store: Redis when configured, otherwise process memory
    let store: Arc<dyn SnapshotStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Snapshot store: Redis (key {})", config.snapshot_key);
            Arc::new(RedisSnapshotStore::new(client, config.snapshot_key.clone()))
        }
        None => {
            info!("Snapshot store: in-memory (REDIS_URL not set)");
            Arc::new(MemorySnapshotStore::default())
        }
    };

    let (session, autosave_worker) = ResumeSession::open(store, config.autosave_debounce).await;
    info!(
        "Autosave debounce: {}ms",
        config.autosave_debounce.as_millis()
    );

    // Build app state
    let state = AppState {
        session: Arc::new(session),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the editor has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and with it the last session handle) is gone; the worker
    // flushes any pending autosave and exits.
    autosave_worker.await?;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
