//! # Folio Vector
//!
//! Chroma HTTP client implementing the `VectorIndex` contract: similarity
//! query with optional metadata filter, and upsert for the ingestion side.
//! The collection is resolved lazily (created if missing) and its UUID is
//! cached for the lifetime of the client.

mod chroma;

pub use chroma::ChromaStore;
