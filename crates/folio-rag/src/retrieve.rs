//! Retrieval with single broadened fallback.

use folio_core::error::Result;
use folio_core::traits::VectorIndex;
use folio_core::types::{IntentSignal, RetrievedCandidate};
use std::collections::HashMap;

/// Top-K for comprehensive questions.
const TOP_K_COMPREHENSIVE: usize = 10;
/// Top-K for focused questions and for the unfiltered fallback.
const TOP_K_DEFAULT: usize = 5;

/// Query the vector store using the intent's category filter; if nothing
/// comes back (the category guess was wrong or too narrow), retry once
/// without a filter at the default K. No further retries.
pub async fn retrieve_with_fallback(
    index: &dyn VectorIndex,
    embedding: &[f32],
    intent: &IntentSignal,
) -> Result<Vec<RetrievedCandidate>> {
    let top_k = if intent.comprehensive {
        TOP_K_COMPREHENSIVE
    } else {
        TOP_K_DEFAULT
    };
    let filter = intent.category.map(|c| {
        HashMap::from([("category".to_string(), c.as_str().to_string())])
    });

    let results = index.query(embedding, top_k, filter).await?;
    if !results.is_empty() {
        return Ok(results);
    }

    tracing::debug!("No results, retrying without filter");
    index.query(embedding, TOP_K_DEFAULT, None).await
}
