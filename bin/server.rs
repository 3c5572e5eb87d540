// Receipt Points - Web Server
// REST API with Axum

use anyhow::{Context, Result};
use receipt_points::{api, Config, ReceiptStore, VERSION};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("receipt_points=info,tower_http=info")),
        )
        .with_target(true)
        .init();

    tracing::info!(version = VERSION, "starting receipt points server");

    let config = Config::load();
    tracing::info!(
        environment = %config.environment,
        address = %config.bind_address(),
        read_timeout = ?config.read_timeout,
        write_timeout = ?config.write_timeout,
        "configuration loaded"
    );

    // Create shared store
    let store = ReceiptStore::new();
    if config.load_example_data {
        store
            .load_example_data()
            .context("Failed to load example receipts")?;
        let count = store.len().context("Failed to count example receipts")?;
        tracing::info!(count, "example receipts loaded");
    }

    let app = api::app(store, &config);

    // Start server
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address {addr}"))?;

    tracing::info!(%addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
