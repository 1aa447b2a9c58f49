use anyhow::Context;
use tracing::info;

use crate::app::{app, AppState};
use crate::config::CONFIG;
use crate::database::DatabaseManager;

pub async fn handle(host: Option<String>, port: Option<u16>, skip_migrations: bool) -> anyhow::Result<()> {
    info!("Starting Gift Certificates API in {:?} mode", CONFIG.environment);

    let pool = DatabaseManager::main_pool()
        .await
        .context("failed to connect to database (is DATABASE_URL set?)")?;
    if !skip_migrations {
        DatabaseManager::migrate().await.context("failed to apply migrations")?;
    }

    let host = host.unwrap_or_else(|| CONFIG.server.host.clone());
    let port = port.unwrap_or(CONFIG.server.port);
    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Gift Certificates API listening on http://{}", bind_addr);

    axum::serve(listener, app(AppState::postgres(pool)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
