//! Azure OpenAI embedding client.

use async_trait::async_trait;
use folio_core::config::AzureConfig;
use folio_core::error::{FolioError, Result};
use folio_core::traits::Embedder;
use serde_json::{Value, json};

/// Client for an Azure OpenAI embedding deployment.
pub struct AzureEmbeddingClient {
    base_url: String,
    api_key: String,
    deployment: String,
    api_version: String,
    client: reqwest::Client,
}

impl AzureEmbeddingClient {
    pub fn new(config: &AzureConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.resolve_api_key(),
            deployment: config.embedding_deployment.clone(),
            api_version: config.embedding_api_version.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
            self.base_url, self.deployment, self.api_version
        )
    }
}

/// Pull the first embedding vector out of an Azure embeddings response.
fn parse_embedding_response(json: &Value) -> Result<Vec<f32>> {
    let embedding = json["data"]
        .get(0)
        .and_then(|d| d["embedding"].as_array())
        .ok_or_else(|| FolioError::Embedding("No embedding in response".into()))?;

    Ok(embedding
        .iter()
        .filter_map(|v| v.as_f64())
        .map(|v| v as f32)
        .collect())
}

#[async_trait]
impl Embedder for AzureEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = self.endpoint();
        tracing::debug!(chars = text.len(), "Requesting embedding");

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("api-key", &self.api_key)
            .json(&json!({ "input": text }))
            .send()
            .await
            .map_err(|e| FolioError::Embedding(format!("Request failed ({url}): {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(FolioError::Embedding(format!(
                "Azure embeddings API error {status}: {body}"
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| FolioError::Embedding(e.to_string()))?;
        parse_embedding_response(&json)
    }
}
