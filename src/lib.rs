//! Jarvis RAG
//!
//! A personal knowledge assistant: store short notes and documents, retrieve
//! the ones relevant to a question by embedding similarity, and answer with a
//! generation backend from a token-budgeted prompt.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use api::state::{AppState, ModelInfo};
use infrastructure::embedding::{EmbedderFactory, EmbeddingProviderType};
use infrastructure::generation::{GenerationBackendFactory, GenerationBackendType};
use infrastructure::ingestion::ParagraphChunker;
use infrastructure::knowledge_store::KnowledgeStoreFactory;
use infrastructure::services::{AnswerService, KnowledgeManager, PromptAssembler, Retriever};
use infrastructure::vector_index::InMemoryVectorIndex;

/// Build every component from configuration and wire them together.
///
/// A durable store is reindexed before the state is returned, so the vector
/// index starts in step with the stored entries.
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    config.validate().context("Invalid configuration")?;

    let store = KnowledgeStoreFactory::create(&config.storage)
        .await
        .context("Failed to create knowledge store")?;
    let embedder =
        EmbedderFactory::create(&config.embedding).context("Failed to create embedder")?;
    let index = Arc::new(InMemoryVectorIndex::new(embedder.dimensions()));

    info!(
        storage = store.backend_name(),
        embedder = embedder.name(),
        dimensions = embedder.dimensions(),
        "Knowledge base components created"
    );

    let manager = KnowledgeManager::new(store.clone(), index.clone(), embedder.clone())?
        .with_chunking(Arc::new(ParagraphChunker::new()), config.chunking.clone())?;
    let manager = Arc::new(manager);

    if store.is_durable() {
        let indexed = manager
            .reindex()
            .await
            .context("Failed to rebuild the vector index")?;
        info!(entries = indexed, "Vector index rebuilt from storage");
    }

    let retriever = Arc::new(
        Retriever::new(embedder, index, store).with_min_score(config.retrieval.min_score),
    );
    let assembler = PromptAssembler::new(config.prompt.clone())?;
    let backend = GenerationBackendFactory::create(&config.generation)
        .context("Failed to create generation backend")?;

    info!(backend = backend.name(), "Generation backend created");

    let answers = AnswerService::new(
        retriever,
        assembler,
        backend,
        config.retrieval.answer_config(),
    )?;

    Ok(AppState::new(manager, Arc::new(answers))
        .with_models(model_info(config))
        .with_ask_timeout(Duration::from_secs(config.server.request_timeout_secs))
        .with_max_upload_bytes(config.server.max_upload_bytes))
}

fn model_info(config: &AppConfig) -> ModelInfo {
    let generation_model = match config.generation.backend {
        GenerationBackendType::Mock => "mock".to_string(),
        GenerationBackendType::Live => config.generation.model.clone(),
    };
    let embedding_model = match config.embedding.provider {
        EmbeddingProviderType::Hashing => "hashing".to_string(),
        EmbeddingProviderType::OpenAi => config.embedding.model.clone(),
    };

    ModelInfo {
        generation_model,
        embedding_model,
    }
}
