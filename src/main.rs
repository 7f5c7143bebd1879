//! # Folio — Portfolio RAG Chat Service
//!
//! Answers questions about a portfolio by retrieving evidence from a Chroma
//! vector index and grounding an Azure OpenAI chat model on it.
//!
//! Usage:
//!   folio serve                          # Start the HTTP gateway
//!   folio ask "What are your skills?"    # One-shot question on the CLI
//!   folio --config ./folio.toml serve    # Explicit config file

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use folio_core::FolioConfig;
use folio_gateway::AppState;
use folio_providers::{AzureChatClient, AzureEmbeddingClient};
use folio_rag::RagPipeline;
use folio_vector::ChromaStore;

#[derive(Parser)]
#[command(name = "folio", version, about = "Portfolio RAG chat service")]
struct Cli {
    /// Path to config file (default: ~/.folio/config.toml)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP gateway
    Serve,
    /// Ask a single question and print the answer
    Ask {
        question: String,
    },
}

fn build_pipeline(config: &FolioConfig) -> RagPipeline {
    let embedder = Arc::new(AzureEmbeddingClient::new(&config.azure));
    let index = Arc::new(ChromaStore::new(&config.chroma));
    let chat = Arc::new(AzureChatClient::new(
        &config.azure,
        config.chat.temperature,
    ));
    RagPipeline::new(embedder, index, chat, config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "folio=debug,tower_http=debug"
    } else {
        "folio=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => FolioConfig::load_from(path)?,
        None => FolioConfig::load()?,
    };

    match cli.command {
        Command::Serve => {
            let state = Arc::new(AppState {
                pipeline: build_pipeline(&config),
            });
            folio_gateway::serve(state, &config.gateway).await?;
        }
        Command::Ask { question } => {
            let pipeline = build_pipeline(&config);
            let answer = pipeline.answer_text(&question).await?;
            println!("{answer}");
        }
    }

    Ok(())
}
