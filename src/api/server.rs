//! Portal API server lifecycle: bind, spawn the axum server in a
//! background task, and hand back a handle with a shutdown channel.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::api::router::portal_api_router;
use crate::api::types::ApiContext;

// ═══════════════════════════════════════════════════════════
// Public types
// ═══════════════════════════════════════════════════════════

/// Metadata for a running portal API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalApiSession {
    pub session_id: String,
    pub server_addr: String,
    pub port: u16,
    pub started_at: String,
}

/// Handle to a running portal API server.
pub struct PortalApiServer {
    pub session: PortalApiSession,
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl PortalApiServer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.session.server_addr)
    }

    /// Shut down the server gracefully.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Portal API server shutdown signal sent");
        }
    }

    /// Wait for the server task to finish.
    pub async fn wait(mut self) {
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                tracing::error!("Portal API server task failed: {e}");
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Server lifecycle
// ═══════════════════════════════════════════════════════════

/// Start the portal API server on `addr` (port 0 picks an ephemeral port).
pub async fn start_portal_server_on(
    ctx: ApiContext,
    addr: SocketAddr,
) -> Result<PortalApiServer, String> {
    let schema_ctx = ctx.clone();
    tokio::task::spawn_blocking(move || schema_ctx.ensure_schema())
        .await
        .map_err(|e| format!("Database preparation task failed: {e}"))?
        .map_err(|e| format!("Failed to prepare portal database: {e}"))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind portal API server: {e}"))?;

    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    tracing::info!(%addr, "Portal API server binding");

    let app = portal_api_router(ctx);

    let session = PortalApiSession {
        session_id: Uuid::new_v4().to_string(),
        server_addr: addr.to_string(),
        port: addr.port(),
        started_at: chrono::Utc::now().to_rfc3339(),
    };

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let join = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("Portal API server received shutdown signal");
        };

        tracing::info!(%addr, "Portal API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("Portal API server error: {e}");
        }

        tracing::info!("Portal API server stopped");
    });

    Ok(PortalApiServer {
        session,
        shutdown_tx: Some(shutdown_tx),
        join: Some(join),
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
