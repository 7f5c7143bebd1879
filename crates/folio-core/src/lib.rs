//! # Folio Core
//!
//! Shared foundation for the Folio portfolio chat service: configuration,
//! the error taxonomy, wire/domain types, and the async traits that the
//! RAG pipeline uses to talk to its external collaborators (embedding
//! service, vector store, chat model).

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::FolioConfig;
pub use error::{FolioError, Result};
