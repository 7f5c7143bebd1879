//! Evidence context assembly.
//!
//! Renders the selected candidates into the size-bounded text block handed
//! to the chat model. The character cap bounds prompt size no matter how
//! many candidates arrive or how long their documents are.

use folio_core::types::RetrievedCandidate;
use serde_json::Value;

/// Marker appended when the context hits the character cap.
const TRUNCATION_MARKER: &str = "\n[Content truncated...]";

/// Assembled context plus the number of candidates actually rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledContext {
    pub text: String,
    pub included: usize,
}

/// Render up to `min(8, n)` candidates for comprehensive questions, else
/// `min(3, n)`, each as a numbered SOURCE block with optional year and
/// priority annotations. Hard-truncate past `char_limit` characters.
pub fn assemble(
    candidates: &[RetrievedCandidate],
    comprehensive: bool,
    char_limit: usize,
) -> AssembledContext {
    let limit = if comprehensive {
        candidates.len().min(8)
    } else {
        candidates.len().min(3)
    };

    let mut context = String::new();
    for (i, candidate) in candidates.iter().take(limit).enumerate() {
        context.push_str(&format!("=== SOURCE {} ===\n", i + 1));
        context.push_str(&candidate.document);
        if let Some(year) = candidate.meta("year") {
            context.push_str(&format!("\n[Year: {}]", display(year)));
        }
        if let Some(rank) = candidate.meta("rank") {
            context.push_str(&format!(" [Priority: {}]", display(rank)));
        }
        context.push_str("\n\n");
    }

    if context.chars().count() > char_limit {
        let mut truncated: String = context.chars().take(char_limit).collect();
        truncated.push_str(TRUNCATION_MARKER);
        context = truncated;
    }

    AssembledContext { text: context, included: limit }
}

/// Metadata values render without JSON quoting.
fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
