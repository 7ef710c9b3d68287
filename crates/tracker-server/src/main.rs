//! coin-tracker HTTP Server
//!
//! Axum-based server exposing the tracker's prices, ledger, forecasts and
//! chat commands as a REST API. A background job keeps the price cache warm.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coin_tracker::{RefreshJob, Tracker, TrackerConfig};

use crate::handlers::{
    add_purchase, forecast, get_history, get_portfolio, get_prices, health_check, list_commands,
    run_command,
};
use crate::state::AppState;

pub(crate) fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health_check))

        // Tracker API
        .route("/api/prices", get(get_prices))
        .route("/api/portfolio", get(get_portfolio))
        .route("/api/history", get(get_history))
        .route("/api/purchases", post(add_purchase))
        .route("/api/forecast", post(forecast))

        // Chat commands
        .route("/api/commands", get(list_commands))
        .route("/api/command", post(run_command))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();
    let config = TrackerConfig::from_env();

    tracing::info!(ticker = %config.ticker_base_url, history = %config.history_base_url, "Market data sources");
    tracing::info!(ledger = %config.ledger_path.display(), "Purchase ledger");

    let tracker = Arc::new(Tracker::from_config(&config).await?);

    // Keep prices fresh in the background; first refresh runs now
    let cancel = CancellationToken::new();
    let refresh = RefreshJob::spawn(tracker.cache(), config.fresh_window, cancel.clone());
    tracing::info!(every_secs = config.fresh_window.as_secs(), "✓ Price refresh scheduled");

    let state = AppState::new(Arc::clone(&tracker));
    tracing::info!("Registered {} commands:", state.commands.len());
    for name in state.commands.names() {
        tracing::info!("  • {}", name);
    }

    let app = build_router(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 coin-tracker server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health          - Health check");
    tracing::info!("  GET  /api/prices      - Current prices");
    tracing::info!("  GET  /api/portfolio   - Holdings and profit");
    tracing::info!("  GET  /api/history     - Purchase history");
    tracing::info!("  POST /api/purchases   - Record a purchase");
    tracing::info!("  POST /api/forecast    - 7-day profit forecast");
    tracing::info!("  GET  /api/commands    - List chat commands");
    tracing::info!("  POST /api/command     - Run a chat command");
    tracing::info!("");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await?;

    refresh.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl-C, after telling background work to stop
async fn shutdown_signal(cancel: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown requested");
    cancel.cancel();
}
