//! Embedder implementations

mod factory;
mod hashing;
mod openai;

pub use factory::{EmbedderFactory, EmbeddingConfig, EmbeddingProviderType};
pub use hashing::{HashingEmbedder, DEFAULT_HASHING_DIMENSIONS, DEFAULT_MAX_INPUT_CHARS};
pub use openai::OpenAiEmbedder;

pub use super::llm::{HttpClient, HttpClientTrait};
