//! Route handlers.

use axum::{Json, extract::State, http::StatusCode};
use folio_core::error::FolioError;
use folio_core::types::{ChatRequest, ChatResponse};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::server::AppState;

type ApiError = (StatusCode, Json<Value>);

/// Collaborator failures surface to HTTP callers as 502; everything else
/// (config mishaps, I/O) as 500.
fn map_error(e: FolioError) -> ApiError {
    let status = match e {
        FolioError::Embedding(_) | FolioError::VectorStore(_) | FolioError::Model(_) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::error!("Chat request failed: {e}");
    (status, Json(json!({ "ok": false, "error": e.to_string() })))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// POST /api/chat/query — the stateful entry point. The caller holds the
/// conversation: full history in, cumulative token total round-tripped.
pub async fn chat_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let response = state.pipeline.answer(&request).await.map_err(map_error)?;
    Ok(Json(response))
}

#[derive(Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// POST /api/chat/ask — legacy single-question endpoint, no token
/// accounting.
pub async fn chat_ask(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<Value>, ApiError> {
    let answer = state
        .pipeline
        .answer_text(&request.question)
        .await
        .map_err(map_error)?;
    Ok(Json(json!({ "answer": answer })))
}
