//! Chroma REST client.

use async_trait::async_trait;
use folio_core::config::ChromaConfig;
use folio_core::error::{FolioError, Result};
use folio_core::traits::VectorIndex;
use folio_core::types::RetrievedCandidate;
use serde_json::{Value, json};
use std::collections::HashMap;
use tokio::sync::OnceCell;

/// HTTP client for a single Chroma collection.
pub struct ChromaStore {
    base_url: String,
    collection_name: String,
    /// Collection UUID, resolved on first use.
    collection_id: OnceCell<String>,
    client: reqwest::Client,
}

impl ChromaStore {
    pub fn new(config: &ChromaConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            collection_name: config.collection.clone(),
            collection_id: OnceCell::new(),
            client: reqwest::Client::new(),
        }
    }

    /// Resolve the collection UUID, creating the collection if it does not
    /// exist yet. Chroma reports a missing collection either as a 404 or as
    /// a 500 whose body says "does not exist", depending on version.
    async fn collection_id(&self) -> Result<&str> {
        self.collection_id
            .get_or_try_init(|| async {
                let url = format!(
                    "{}/api/v1/collections/{}",
                    self.base_url, self.collection_name
                );
                let resp = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| FolioError::VectorStore(format!("Chroma unreachable: {e}")))?;

                let status = resp.status();
                if status.is_success() {
                    let body: Value = resp
                        .json()
                        .await
                        .map_err(|e| FolioError::VectorStore(e.to_string()))?;
                    return extract_collection_id(&body);
                }

                let text = resp.text().await.unwrap_or_default();
                let missing = status.as_u16() == 404
                    || (status.as_u16() == 500 && text.contains("does not exist"));
                if missing {
                    tracing::info!(
                        collection = %self.collection_name,
                        "Collection not found, creating"
                    );
                    self.create_collection().await
                } else {
                    Err(FolioError::VectorStore(format!(
                        "Chroma error {status} looking up collection: {text}"
                    )))
                }
            })
            .await
            .map(|s| s.as_str())
    }

    async fn create_collection(&self) -> Result<String> {
        let url = format!("{}/api/v1/collections", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&json!({ "name": self.collection_name }))
            .send()
            .await
            .map_err(|e| FolioError::VectorStore(format!("Create collection failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(FolioError::VectorStore(format!(
                "Chroma error {status} creating collection: {text}"
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| FolioError::VectorStore(e.to_string()))?;
        extract_collection_id(&body)
    }
}

fn extract_collection_id(body: &Value) -> Result<String> {
    body["id"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| FolioError::VectorStore("Collection response has no 'id'".into()))
}

/// Zip Chroma's parallel result arrays (documents/metadatas/distances, one
/// inner array per query embedding) into candidates. Missing or shorter
/// metadata/distance arrays degrade to `None` per candidate.
fn parse_query_response(body: &Value) -> Vec<RetrievedCandidate> {
    let docs = match body["documents"].get(0).and_then(|d| d.as_array()) {
        Some(docs) => docs,
        None => return Vec::new(),
    };
    let metadatas = body["metadatas"].get(0).and_then(|m| m.as_array());
    let distances = body["distances"].get(0).and_then(|d| d.as_array());

    docs.iter()
        .enumerate()
        .filter_map(|(i, doc)| {
            let document = doc.as_str()?.to_string();
            let metadata = metadatas
                .and_then(|m| m.get(i))
                .and_then(|m| m.as_object())
                .cloned();
            let distance = distances
                .and_then(|d| d.get(i))
                .and_then(|d| d.as_f64())
                .map(|d| d as f32);
            Some(RetrievedCandidate { document, metadata, distance })
        })
        .collect()
}

#[async_trait]
impl VectorIndex for ChromaStore {
    async fn query(
        &self,
        embedding: &[f32],
        top_k: usize,
        filter: Option<HashMap<String, String>>,
    ) -> Result<Vec<RetrievedCandidate>> {
        let id = self.collection_id().await?;
        let url = format!("{}/api/v1/collections/{}/query", self.base_url, id);

        let mut body = json!({
            "query_embeddings": [embedding],
            "n_results": top_k,
            "include": ["documents", "distances", "metadatas"],
        });
        if let Some(filter) = filter {
            if !filter.is_empty() {
                body["where"] = json!(filter);
            }
        }

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FolioError::VectorStore(format!("Query failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(FolioError::VectorStore(format!(
                "Chroma query error {status}: {text}"
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| FolioError::VectorStore(e.to_string()))?;
        let candidates = parse_query_response(&json);
        tracing::debug!(count = candidates.len(), top_k, "Chroma query returned");
        Ok(candidates)
    }

    async fn upsert(
        &self,
        id: &str,
        embedding: &[f32],
        document: &str,
        metadata: Option<serde_json::Map<String, Value>>,
    ) -> Result<()> {
        let collection = self.collection_id().await?;
        let url = format!("{}/api/v1/collections/{}/upsert", self.base_url, collection);

        let metadata = metadata.unwrap_or_else(|| {
            let mut m = serde_json::Map::new();
            m.insert("source".into(), json!("portfolio"));
            m
        });
        let body = json!({
            "ids": [id],
            "embeddings": [embedding],
            "documents": [document],
            "metadatas": [metadata],
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FolioError::VectorStore(format!("Upsert failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(FolioError::VectorStore(format!(
                "Chroma upsert error {status}: {text}"
            )));
        }

        tracing::debug!(id, "Upserted document");
        Ok(())
    }
}
