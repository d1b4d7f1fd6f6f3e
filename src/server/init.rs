//! Server initialization and main run loop
//!
//! Contains `init_services()`, shared with the CLI commands, and the
//! `run()` function that serves HTTP until shutdown.

use super::config::AppConfig;
use super::init_helpers::{
    init_embedding_provider, init_sheet_sink, init_summarizer, init_vector_index,
};
use super::loader::load_config;
use super::state::{AppState, Integrations};
use super::validation::validate_production_config;
use anyhow::{Context, Result};
use relation_core::SideEffectQueue;
use relation_store::RelationStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// How long shutdown waits for queued side effects
const EFFECTS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Open the store, start the side-effect worker and wire every service.
pub async fn init_services(config: &AppConfig) -> Result<(Arc<AppState>, JoinHandle<()>)> {
    let db_path = config.database_path();
    info!("Database: {}", db_path.display());
    let store = RelationStore::from_path(&db_path)
        .await
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;

    let (effects, worker) = SideEffectQueue::spawn(config.effects.queue_capacity);
    info!(
        capacity = config.effects.queue_capacity,
        "Side-effect queue started"
    );

    let integrations = Integrations {
        embedder: init_embedding_provider(config),
        index: init_vector_index(config),
        sheets: init_sheet_sink(config),
        summarizer: init_summarizer(config),
    };

    let state = AppState::new(
        store,
        effects,
        integrations,
        config.clusters.seed,
        config.auth.cookie_name.clone(),
    );
    Ok((Arc::new(state), worker))
}

/// Wait for queued side effects, bounded by a timeout.
pub async fn drain_effects(state: &AppState) {
    if tokio::time::timeout(EFFECTS_DRAIN_TIMEOUT, state.effects.flush())
        .await
        .is_err()
    {
        warn!("Side-effect queue did not drain before timeout");
    }
}

/// Run the server
pub async fn run() -> Result<()> {
    info!("Starting Relation v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config().context("Failed to load configuration")?;
    info!("Configuration loaded");

    validate_production_config(&config);

    let (state, _worker) = init_services(&config).await?;

    let app = crate::api::router(Arc::clone(&state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("HTTP server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Draining side effects...");
    drain_effects(&state).await;

    info!("Relation shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
