//! Epidash web server
//!
//! Run with: cargo run -p epidash-web

use std::sync::Arc;

use epidash_config::Config;
use epidash_db::Database;
use epidash_web::{router::build_router, state::AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("epidash=debug,info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load()?;
    info!(bind = %config.server.bind, backend = ?config.llm.backend, "Starting Epidash...");

    let db = Database::connect(&config.database.url, config.database.max_connections).await?;
    db.initialize().await?;
    let db = Arc::new(db);

    let state = AppState::from_config(&config, db.clone())?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
