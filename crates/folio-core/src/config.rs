//! Folio configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FolioConfig {
    #[serde(default)]
    pub azure: AzureConfig,
    #[serde(default)]
    pub chroma: ChromaConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub persona: PersonaConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl FolioConfig {
    /// Load config from the default path (~/.folio/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::FolioError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| crate::error::FolioError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".folio")
            .join("config.toml")
    }
}

/// Azure OpenAI configuration — shared by the embedding and chat clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_chat_deployment")]
    pub chat_deployment: String,
    #[serde(default = "default_chat_api_version")]
    pub chat_api_version: String,
    #[serde(default = "default_embedding_deployment")]
    pub embedding_deployment: String,
    #[serde(default = "default_embedding_api_version")]
    pub embedding_api_version: String,
}

fn default_chat_deployment() -> String { "gpt-4o-mini".into() }
fn default_chat_api_version() -> String { "2024-02-15-preview".into() }
fn default_embedding_deployment() -> String { "text-embedding-ada-002".into() }
fn default_embedding_api_version() -> String { "2023-05-15".into() }

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            chat_deployment: default_chat_deployment(),
            chat_api_version: default_chat_api_version(),
            embedding_deployment: default_embedding_deployment(),
            embedding_api_version: default_embedding_api_version(),
        }
    }
}

impl AzureConfig {
    /// Resolve the API key: config value, then AZURE_OPENAI_API_KEY env var.
    pub fn resolve_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            self.api_key.clone()
        } else {
            std::env::var("AZURE_OPENAI_API_KEY").unwrap_or_default()
        }
    }
}

/// Chroma vector store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChromaConfig {
    #[serde(default = "default_chroma_url")]
    pub url: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_chroma_url() -> String { "http://localhost:8000".into() }
fn default_collection() -> String { "portfolio".into() }

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            url: default_chroma_url(),
            collection: default_collection(),
        }
    }
}

/// Chat pipeline tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Cumulative per-conversation token ceiling enforced by the budget guard.
    #[serde(default = "default_token_limit")]
    pub token_limit: u32,
    /// Hard cap on the assembled evidence context, in characters.
    #[serde(default = "default_context_char_limit")]
    pub context_char_limit: usize,
}

fn default_temperature() -> f32 { 0.2 }
fn default_token_limit() -> u32 { 3000 }
fn default_context_char_limit() -> usize { 4000 }

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            token_limit: default_token_limit(),
            context_char_limit: default_context_char_limit(),
        }
    }
}

/// Persona for the system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Portfolio owner's name, used in the assistant's system prompt.
    #[serde(default = "default_owner")]
    pub owner: String,
}

fn default_owner() -> String { "the portfolio owner".into() }

impl Default for PersonaConfig {
    fn default() -> Self {
        Self { owner: default_owner() }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 { 3000 }
fn default_host() -> String { "127.0.0.1".into() }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FolioConfig::default();
        assert_eq!(config.chroma.collection, "portfolio");
        assert_eq!(config.chat.token_limit, 3000);
        assert_eq!(config.chat.context_char_limit, 4000);
        assert!((config.chat.temperature - 0.2).abs() < 0.01);
        assert_eq!(config.gateway.port, 3000);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            [azure]
            base_url = "https://example.openai.azure.com"
            chat_deployment = "gpt-4o"

            [chroma]
            url = "http://chroma:8000"
            collection = "cv"

            [persona]
            owner = "Mohamed"
        "#;

        let config: FolioConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.azure.base_url, "https://example.openai.azure.com");
        assert_eq!(config.azure.chat_deployment, "gpt-4o");
        assert_eq!(config.chroma.collection, "cv");
        assert_eq!(config.persona.owner, "Mohamed");
        // Untouched sections keep defaults
        assert_eq!(config.chat.token_limit, 3000);
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let toml_str = "";
        let config: FolioConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.chroma.url, "http://localhost:8000");
        assert_eq!(config.azure.chat_api_version, "2024-02-15-preview");
    }

    #[test]
    fn test_default_path() {
        let path = FolioConfig::default_path();
        assert!(path.to_string_lossy().contains("folio"));
    }
}
