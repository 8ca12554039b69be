use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::post, Router};
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub mod routes;
pub mod state;

use crate::{config::ServerConfig, utils::error::Result};
use routes::{score_handler, verify_handler};
use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/api/verify-aadhaar", post(verify_handler))
        .route("/api/score-aadhaar", post(score_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: ServerConfig) -> Result<()> {
    info!("Initializing state...");
    let state = AppState::new(config)?;

    let address = state.config.bind_address();
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on http://{address}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
