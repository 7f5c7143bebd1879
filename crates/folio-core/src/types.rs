//! Shared wire and domain types.
//!
//! Conversation state is caller-held: `ChatRequest` carries the full history
//! and the running token total on every turn, and `ChatResponse` hands both
//! back. The server never stores either.

use serde::{Deserialize, Serialize};

/// Message role in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire-format name, matching the lowercase serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single conversation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Inbound chat request. The caller resends the full history and the
/// cumulative token total returned by the previous turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub history: Vec<Message>,
    #[serde(default)]
    pub total_tokens_used_so_far: u32,
}

/// Outbound chat response. `total_tokens_used` must be echoed back as the
/// next request's `total_tokens_used_so_far`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub total_tokens_used: u32,
    pub limit_reached: bool,
}

/// One candidate returned by the vector store, closest-first.
///
/// Metadata values are heterogeneous (Chroma stores whatever the ingester
/// wrote — `rank` may be an integer or a numeric string, `year` is free
/// text), so they stay as JSON and are decoded defensively at use sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedCandidate {
    pub document: String,
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    pub distance: Option<f32>,
}

impl RetrievedCandidate {
    /// Look up a metadata value by key.
    pub fn meta(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.as_ref().and_then(|m| m.get(key))
    }
}

/// Portfolio category used as a retrieval filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Experience,
    Project,
    Education,
}

impl Category {
    /// Metadata value stored in the vector index for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Experience => "Experience",
            Category::Project => "Project",
            Category::Education => "Education",
        }
    }
}

/// What the intent classifier read out of the latest question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntentSignal {
    /// Category filter for retrieval, if the question names one.
    pub category: Option<Category>,
    /// Question implies recency preference ("last", "recent", ...).
    pub temporal: bool,
    /// Question asks for an exhaustive answer ("all", "list", ...).
    pub comprehensive: bool,
}

/// Result of one chat-completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    pub content: String,
    pub total_tokens: u32,
}
