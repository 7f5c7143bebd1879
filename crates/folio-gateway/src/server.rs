//! HTTP server implementation using Axum.

use axum::{
    Router,
    routing::{get, post},
};
use folio_core::config::GatewayConfig;
use folio_core::error::{FolioError, Result};
use folio_rag::RagPipeline;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for the gateway server.
pub struct AppState {
    /// The RAG pipeline — answers every chat request.
    pub pipeline: RagPipeline,
}

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(super::routes::health))
        .route("/api/chat/query", post(super::routes::chat_query))
        .route("/api/chat/ask", post(super::routes::chat_ask))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: Arc<AppState>, config: &GatewayConfig) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FolioError::Http(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!("Gateway listening on http://{addr}");

    axum::serve(listener, build_router(state))
        .await
        .map_err(|e| FolioError::Http(format!("Server error: {e}")))?;
    Ok(())
}
