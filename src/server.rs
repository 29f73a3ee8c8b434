// file: src/server.rs
// description: HTTP health, readiness, status and version endpoints
// reference: https://docs.rs/axum

use crate::error::Result;
use crate::sync::{SyncEngine, SyncStatus};
use crate::version;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

pub fn router(engine: Arc<SyncEngine>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/version", get(version_info))
        .with_state(engine)
}

/// Binds the status server and runs it until an interrupt or SIGTERM.
pub async fn serve(engine: Arc<SyncEngine>, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Health check server listening on port {}", port);

    axum::serve(listener, router(engine))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Liveness probe: 204 when the last cycle succeeded, 503 otherwise.
async fn healthz(State(engine): State<Arc<SyncEngine>>) -> StatusCode {
    if engine.is_healthy() {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn readyz(State(engine): State<Arc<SyncEngine>>) -> impl IntoResponse {
    if engine.is_healthy() {
        (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ready" })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "not ready" })),
        )
    }
}

async fn metrics(State(engine): State<Arc<SyncEngine>>) -> Json<SyncStatus> {
    Json(engine.snapshot())
}

async fn version_info() -> Json<version::VersionInfo> {
    Json(version::info())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install interrupt handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received interrupt, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
