//! ImageFactory HTTP API Library
//!
//! Axum server exposing the admin, evolution, content and page endpoints
//! over an initialized [`Platform`].

pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

use tracing::info;

use common::{AppError, AppResult};
use platform::{Platform, PlatformConfig};

use crate::routes::create_router;
use crate::state::AppState;

/// Options of the `serve` command.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub host: String,
    pub port: u16,
    /// Use the memory backends instead of PostgreSQL and the filesystem
    pub in_memory: bool,
}

/// Initialize the backends and run the HTTP server until shutdown.
pub async fn run_server(config: PlatformConfig, options: ServeOptions) -> AppResult<()> {
    let platform = if options.in_memory {
        Platform::in_memory(config)?
    } else {
        Platform::connect(config).await?
    };

    let app = create_router(AppState::from_platform(platform));

    let addr = format!("{}:{}", options.host, options.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;
    info!("ImageFactory API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
