use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;
use configs::AppConfig;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Prefer `config.toml` (or `CONFIG_PATH`); fall back to env vars.
pub fn load_config() -> Result<AppConfig, StartupError> {
    AppConfig::load_and_validate()
        .or_else(|file_err| {
            info!(error = %file_err, "config file unusable, reading environment");
            AppConfig::from_env()
        })
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
    }
}

/// Public entry: build the store, the app and run the HTTP server until Ctrl+C.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    let store = service::runtime::build_store(&cfg).await?;
    info!(load = ?store.load_status(), "staged store ready");

    let state = ServerState { store: Arc::clone(&store) };
    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting creation store server");
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)?;

    let pending = store.snapshot().await.len();
    if pending > 0 {
        tracing::warn!(pending, "shutting down with uncommitted creations; they are discarded");
    }
    Ok(())
}
