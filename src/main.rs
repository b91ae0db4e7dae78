use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use stockshare::core::config::ServerConfig;
use stockshare::core::telemetry::logging::init_logging;
use stockshare::server::{self, AppState};
use stockshare::services::fs::PathScopedFileStore;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = ServerConfig::parse();
    config.validate()?;
    let base_url = config.normalized_base_url();

    let store = PathScopedFileStore::new(&config.root, base_url.clone())
        .with_context(|| format!("cannot serve files from {}", config.root.display()))?;
    if !store.check_accessible() {
        warn!(root = %store.root().display(), "root directory is not accessible at startup");
    }

    let credentials = config.credentials();
    if credentials.is_none() {
        warn!("no credentials configured, authentication is disabled");
    }

    let app = server::router(
        AppState::new(store, credentials),
        &base_url,
        config.max_upload_bytes(),
    );

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("cannot bind {}", config.bind))?;
    info!(addr = %config.bind, base_url = %base_url, "file share listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
