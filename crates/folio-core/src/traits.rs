//! Collaborator traits — the seams between the RAG pipeline and its
//! external services. Each call is blocking call-and-wait from the
//! pipeline's perspective; timeouts and retries belong to the
//! implementations, not the pipeline.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;
use crate::types::{ChatCompletion, Message, RetrievedCandidate};

/// Turns text into a fixed-length embedding vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Vector store queried by embedding similarity.
///
/// `query` returns candidates closest-first and an empty vec (not an error)
/// when nothing matches. `upsert` is the ingestion-side half of the contract.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn query(
        &self,
        embedding: &[f32],
        top_k: usize,
        filter: Option<HashMap<String, String>>,
    ) -> Result<Vec<RetrievedCandidate>>;

    async fn upsert(
        &self,
        id: &str,
        embedding: &[f32],
        document: &str,
        metadata: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<()>;
}

/// Chat-completion model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<ChatCompletion>;
}
