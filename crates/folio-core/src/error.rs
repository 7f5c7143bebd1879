//! Folio error taxonomy.
//!
//! External collaborator failures keep their origin: an embedding transport
//! failure is an `Embedding` error, not a generic HTTP one. The pipeline
//! never recovers these locally — they propagate to the calling layer.

use thiserror::Error;

/// All errors produced by Folio crates.
#[derive(Debug, Error)]
pub enum FolioError {
    /// Configuration file missing, unreadable, or malformed.
    #[error("Config error: {0}")]
    Config(String),

    /// Embedding service transport or parse failure.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector store transport or protocol failure.
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// Chat model returned no usable choice, or the call failed.
    #[error("Model error: {0}")]
    Model(String),

    /// HTTP-layer failure not attributable to a specific collaborator.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Filesystem I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across all Folio crates.
pub type Result<T> = std::result::Result<T, FolioError>;
