//! # Folio RAG
//!
//! The retrieval-augmented answering pipeline. One request flows through a
//! fixed sequence of stages:
//!
//! ```text
//! TokenCheck → Embed → Retrieve → [Fallback] → [Rank] → Assemble → Invoke
//! ```
//!
//! with early-return degrade paths (empty history, non-user last message,
//! exhausted budget, no retrievable evidence) that answer with a fixed
//! sentence and never touch the chat model. All state is request-local;
//! the conversation's cumulative token count travels with the caller.

pub mod budget;
pub mod context;
pub mod intent;
pub mod pipeline;
pub mod query;
pub mod rank;
pub mod retrieve;

pub use budget::TokenBudget;
pub use pipeline::RagPipeline;
pub use rank::RelevanceRanker;
