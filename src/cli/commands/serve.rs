use anyhow::Context;

use crate::app::app;
use crate::bootstrap;
use crate::config::config;
use crate::state::AppState;

pub async fn handle(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = config().clone();
    if let Some(port) = port {
        config.server.port = port;
    }

    config.validate()?;
    if config.uses_development_secret() {
        tracing::warn!("Using the built-in development JWT secret; set SECURITY_JWT_SECRET outside development");
    }
    tracing::info!("Starting product inventory in {:?} mode", config.environment);

    let bind_addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let state = AppState::from_config(config)
        .await
        .context("failed to initialise storage")?;
    bootstrap::run(&state).await.context("startup seeding failed")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    let database = state.database.clone();
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(database) = database {
        database.close().await;
    }
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
