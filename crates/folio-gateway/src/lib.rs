//! # Folio Gateway
//!
//! Thin HTTP surface over the RAG pipeline. Routing and request parsing
//! only — every decision lives in `folio-rag`.

mod routes;
mod server;

pub use server::{AppState, build_router, serve};
