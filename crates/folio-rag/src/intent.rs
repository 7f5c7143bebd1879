//! Intent classification over the latest user question.
//!
//! Keyword matching is plain substring containment with no word-boundary
//! checks ("currently" triggers the temporal flag). That looseness is
//! intentional and load-bearing for the rest of the pipeline's tuning.

use folio_core::types::{Category, IntentSignal};

/// Classify a question. Pure function of the question text.
pub fn classify(question: &str) -> IntentSignal {
    let lower = question.to_lowercase();

    // Priority order: first match wins. A question mentioning both
    // "project" and "experience" filters on Project.
    let category = if lower.contains("project") {
        Some(Category::Project)
    } else if lower.contains("experience")
        || lower.contains("work")
        || lower.contains("job")
        || lower.contains("professional")
    {
        Some(Category::Experience)
    } else if lower.contains("education")
        || lower.contains("study")
        || lower.contains("degree")
        || lower.contains("university")
    {
        Some(Category::Education)
    } else {
        None
    };

    let temporal = ["last", "recent", "latest", "current", "newest", "most recent"]
        .iter()
        .any(|kw| lower.contains(kw));

    let comprehensive = ["all", "list", "what are"]
        .iter()
        .any(|kw| lower.contains(kw));

    IntentSignal { category, temporal, comprehensive }
}
