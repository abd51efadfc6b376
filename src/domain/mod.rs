//! Domain layer - Core entities, value types and collaborator traits

pub mod conversation;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod knowledge;
pub mod llm;
pub mod prompt;
pub mod retrieval;
pub mod vector_index;

pub use conversation::{ConversationTurn, Role};
pub use embedding::Embedder;
pub use error::DomainError;
pub use generation::GenerationBackend;
pub use ingestion::{Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
pub use knowledge::{
    EntryId, KnowledgeEntry, KnowledgeStore, Metadata, MetadataValue, NewKnowledgeEntry,
};
pub use llm::{
    FinishReason, LlmProvider, LlmRequest, LlmRequestBuilder, LlmResponse, Message, MessageRole,
    Usage,
};
pub use prompt::{AssembledPrompt, BudgetUnit, PromptConfig};
pub use retrieval::{Answer, RetrievalResult};
pub use vector_index::{ScoredId, VectorIndex};
