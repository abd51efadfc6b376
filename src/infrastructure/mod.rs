//! Infrastructure layer - Backends, services and runtime plumbing

pub mod embedding;
pub mod generation;
pub mod ingestion;
pub mod knowledge_store;
pub mod llm;
pub mod logging;
pub mod observability;
pub mod services;
pub mod vector_index;
