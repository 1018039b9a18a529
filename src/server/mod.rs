//! HTTP front end: one exact favicon route, everything else through the gate.

pub mod bootstrap;
pub mod favicon;
pub mod gate;
pub mod port;

use crate::keepalive::KeepaliveHandle;
use crate::rpc::FunctionTable;
use crate::session::ServerContext;
use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// State shared by every request handler.
pub struct AppState {
    pub context: ServerContext,
    pub functions: Arc<dyn FunctionTable>,
    pub keepalive: KeepaliveHandle,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/favicon.ico", get(favicon::handler))
        .fallback(gate::handle)
        .with_state(state)
}

/// Serves `router` on `listener` until the listener fails.
pub async fn serve(listener: TcpListener, router: Router) -> Result<()> {
    let addr = listener
        .local_addr()
        .context("Failed to read listener address")?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, router)
        .await
        .with_context(|| format!("HTTP server on {} failed", addr))
}

#[cfg(test)]
#[path = "tests/server_tests.rs"]
mod tests;
