//! QuakeWatch alert receiver.
//!
//! - Alertmanager webhooks: POST / | /critical | /warning | /quakewatch
//! - Liveness: GET /health
//! - Prometheus scrape: GET /metrics
//! - Alerts echoed to stdout and appended to a size-rotated log file

use tracing_subscriber::{fmt, EnvFilter};

use quakewatch_core::error::{QuakeWatchError, Result};
use quakewatch_core::Classification;
use quakewatch_receiver::{app_state, config, router};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "quakewatch-receiver failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cfg = config::load_from_env()?;
    let listen = cfg.server.listen_addr()?;

    let state = app_state::AppState::new(cfg)?;
    let log_path = state.ingestor().log_file().path().display().to_string();
    let app = router::build_router(state);

    tracing::info!(%listen, "alert-webhook-receiver starting");
    for class in Classification::ALL {
        tracing::info!(method = "POST", route = class.route(), "{class} alerts");
    }
    tracing::info!(method = "GET", route = "/health", "health check");
    tracing::info!(method = "GET", route = "/metrics", "prometheus metrics");
    tracing::info!(path = %log_path, "alert logs will be saved here");

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| QuakeWatchError::Internal(format!("failed to bind {listen}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| QuakeWatchError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
