//! Azure OpenAI chat-completion client.

use async_trait::async_trait;
use folio_core::config::AzureConfig;
use folio_core::error::{FolioError, Result};
use folio_core::traits::ChatModel;
use folio_core::types::{ChatCompletion, Message};
use serde_json::{Value, json};

/// Client for an Azure OpenAI chat deployment.
pub struct AzureChatClient {
    base_url: String,
    api_key: String,
    deployment: String,
    api_version: String,
    temperature: f32,
    client: reqwest::Client,
}

impl AzureChatClient {
    pub fn new(config: &AzureConfig, temperature: f32) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.resolve_api_key(),
            deployment: config.chat_deployment.clone(),
            api_version: config.chat_api_version.clone(),
            temperature,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.base_url, self.deployment, self.api_version
        )
    }
}

/// Extract content and token usage from an Azure chat-completions response.
fn parse_chat_response(json: &Value) -> Result<ChatCompletion> {
    let choice = json["choices"]
        .get(0)
        .ok_or_else(|| FolioError::Model("No choices in response".into()))?;

    let content = choice["message"]["content"]
        .as_str()
        .ok_or_else(|| FolioError::Model("Choice has no message content".into()))?
        .to_string();

    let total_tokens = json["usage"]["total_tokens"].as_u64().unwrap_or(0) as u32;

    Ok(ChatCompletion { content, total_tokens })
}

#[async_trait]
impl ChatModel for AzureChatClient {
    async fn complete(&self, messages: &[Message]) -> Result<ChatCompletion> {
        let url = self.endpoint();
        tracing::debug!(message_count = messages.len(), "Requesting chat completion");

        let body = json!({
            "messages": messages,
            "temperature": self.temperature,
        });

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| FolioError::Model(format!("Request failed ({url}): {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(FolioError::Model(format!(
                "Azure chat API error {status}: {text}"
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| FolioError::Model(e.to_string()))?;
        parse_chat_response(&json)
    }
}
