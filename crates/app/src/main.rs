//! Leadflow calendar ingestion service
//!
//! Loads configuration, opens the encrypted store, starts the periodic sync
//! and serves the HTTP API until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use leadflow_app::utils::logging::init_tracing;
use leadflow_app::{router, AppContext};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the subscriber reads RUST_LOG.
    let dotenv = dotenvy::dotenv();
    init_tracing().context("failed to install tracing subscriber")?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(err) => debug!(error = %err, "No .env file loaded"),
    }

    let config = leadflow_infra::config::load().context("failed to load configuration")?;
    let bind_addr = config.server.bind_addr.clone();

    let ctx = Arc::new(AppContext::new(config).context("failed to initialise application")?);
    ctx.start_background_sync().await.context("failed to start calendar sync")?;

    let listener =
        TcpListener::bind(&bind_addr).await.with_context(|| format!("cannot bind {bind_addr}"))?;
    info!(addr = %bind_addr, "Leadflow listening");

    axum::serve(listener, router(Arc::clone(&ctx)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    ctx.shutdown().await.context("failed to stop calendar sync")?;
    info!("Leadflow stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
}
