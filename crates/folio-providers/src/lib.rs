//! # Folio Providers
//!
//! Azure OpenAI clients for Folio. Both speak the deployment-scoped Azure
//! REST surface (`/openai/deployments/{name}/...?api-version=...`) with
//! `api-key` header auth, and implement the folio-core collaborator traits.

pub mod chat;
pub mod embedding;

pub use chat::AzureChatClient;
pub use embedding::AzureEmbeddingClient;
