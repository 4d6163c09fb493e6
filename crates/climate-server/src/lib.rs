//! HTTP surface of the climate API.
//!
//! Routes are plain GETs that each acquire a session from the shared
//! [`Database`] for the lifetime of one request.

pub mod handlers;
pub mod routes;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use climate_query::ReferenceWindow;
use climate_store::Database;
use tokio_util::sync::CancellationToken;

pub use routes::routes;

/// Dependencies shared by every route.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Window served by `/api/v1.0/tobs`
    pub window: ReferenceWindow,
}

impl AppState {
    pub fn new(db: Database, window: ReferenceWindow) -> Self {
        Self { db, window }
    }
}

/// Serve until `shutdown` is cancelled, then wait for in-flight requests.
pub async fn serve(state: AppState, addr: SocketAddr, shutdown: CancellationToken) -> Result<()> {
    let (bound, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(addr, async move {
            shutdown.cancelled().await;
            tracing::info!("Shutdown requested, draining connections");
        })
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on http://{}", bound);
    server.await;
    tracing::info!("HTTP server stopped");
    Ok(())
}
