//! Embedding-query composition.
//!
//! The similarity search runs against a short trailing window of the
//! conversation, not just the raw question, so follow-ups like "tell me
//! more" still embed enough context to land near the right documents.

use folio_core::types::Message;

/// Number of trailing messages included in the embedding query.
const WINDOW: usize = 3;

/// Render the last `min(3, len)` messages as `"<role>: <content>"` lines,
/// in original order, trimmed.
pub fn embedding_query(history: &[Message]) -> String {
    let start = history.len().saturating_sub(WINDOW);
    let text = history[start..]
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.content))
        .collect::<Vec<_>>()
        .join("\n");
    text.trim().to_string()
}
