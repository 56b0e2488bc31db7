use anyhow::Context;
use clap::Args;

use crate::config::{config, StoreBackend};
use crate::state::AppState;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Store backend: memory or postgres (overrides STORE_BACKEND)")]
    pub store: Option<StoreBackend>,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = config().clone();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(store) = args.store {
        config.database.backend = store;
    }

    tracing::info!("Starting Shopping List API in {:?} mode", config.environment);
    if config.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; every session will be rejected");
    }

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let state = AppState::from_config(config)
        .await
        .context("failed to initialize store")?;
    let app = crate::app::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

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
