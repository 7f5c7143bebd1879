//! Recency-aware reordering for temporal queries.
//!
//! Only applied when the question implies recency; otherwise candidates
//! keep the vector store's similarity order. The sort is stable so equal
//! candidates preserve their retrieval order across runs.

use chrono::Datelike;
use folio_core::types::RetrievedCandidate;
use serde_json::Value;
use std::cmp::Ordering;

/// Comparator state: the injected current year resolves "Present" entries.
#[derive(Debug, Clone, Copy)]
pub struct RelevanceRanker {
    current_year: i32,
}

impl RelevanceRanker {
    /// Ranker anchored to the real calendar year.
    pub fn new() -> Self {
        Self { current_year: chrono::Utc::now().year() }
    }

    /// Ranker with a fixed year, for deterministic tests.
    pub fn with_year(current_year: i32) -> Self {
        Self { current_year }
    }

    /// Stable in-place sort: rank ascending when both present and unequal,
    /// otherwise effective year descending, candidates without a year last.
    pub fn sort(&self, candidates: &mut [RetrievedCandidate]) {
        candidates.sort_by(|a, b| self.compare(a, b));
    }

    fn compare(&self, a: &RetrievedCandidate, b: &RetrievedCandidate) -> Ordering {
        if let (Some(ra), Some(rb)) = (extract_rank(a), extract_rank(b)) {
            if ra != rb {
                return ra.cmp(&rb);
            }
        }
        match (self.effective_year(a), self.effective_year(b)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(ya), Some(yb)) => yb.cmp(&ya),
        }
    }

    /// Effective year: `start_year` if parseable, else the `year` field,
    /// where "present" (any case) means the injected current year and any
    /// other text yields its first 4-digit run.
    fn effective_year(&self, candidate: &RetrievedCandidate) -> Option<i32> {
        if let Some(start) = candidate.meta("start_year").and_then(as_i64) {
            return Some(start as i32);
        }
        let year = candidate.meta("year")?;
        let text = value_text(year);
        if text.to_lowercase().contains("present") {
            return Some(self.current_year);
        }
        first_four_digit_run(&text)
    }
}

impl Default for RelevanceRanker {
    fn default() -> Self {
        Self::new()
    }
}

/// Rank from metadata: native integer or a parseable numeric string.
fn extract_rank(candidate: &RetrievedCandidate) -> Option<i64> {
    candidate.meta("rank").and_then(as_i64)
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// First run of 4 consecutive ASCII digits, e.g. "2020 - 2022" → 2020.
fn first_four_digit_run(text: &str) -> Option<i32> {
    let bytes = text.as_bytes();
    for i in 0..bytes.len().saturating_sub(3) {
        if bytes[i..i + 4].iter().all(u8::is_ascii_digit) {
            return text[i..i + 4].parse().ok();
        }
    }
    None
}
