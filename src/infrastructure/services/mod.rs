//! Application services

mod answer_service;
mod knowledge_manager;
mod prompt_assembler;
mod retriever;

pub use answer_service::{AnswerConfig, AnswerService};
pub use knowledge_manager::{KnowledgeManager, KnowledgeStats, ReconcileReport};
pub use prompt_assembler::PromptAssembler;
pub use retriever::Retriever;
