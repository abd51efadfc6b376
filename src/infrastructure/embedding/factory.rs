//! Embedder factory for runtime provider selection

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use super::hashing::{HashingEmbedder, DEFAULT_HASHING_DIMENSIONS, DEFAULT_MAX_INPUT_CHARS};
use super::openai::OpenAiEmbedder;
use super::HttpClient;
use crate::domain::embedding::Embedder;
use crate::domain::DomainError;

/// Supported embedding providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderType {
    /// Local feature hashing, no network
    #[default]
    Hashing,
    /// Any OpenAI-compatible `/v1/embeddings` endpoint
    OpenAi,
}

/// `embedding` configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProviderType,
    pub dimensions: usize,
    pub max_input_chars: usize,
    pub model: String,
    pub base_url: String,
    pub api_key: String,
    pub request_dimensions: bool,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderType::Hashing,
            dimensions: DEFAULT_HASHING_DIMENSIONS,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            request_dimensions: false,
            timeout_secs: 30,
        }
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.dimensions == 0 {
            return Err(DomainError::configuration(
                "embedding.dimensions must be greater than 0",
            ));
        }
        if self.max_input_chars == 0 {
            return Err(DomainError::configuration(
                "embedding.max_input_chars must be greater than 0",
            ));
        }
        if self.provider == EmbeddingProviderType::OpenAi && self.model.trim().is_empty() {
            return Err(DomainError::configuration(
                "embedding.model is required for the openai provider",
            ));
        }

        Ok(())
    }
}

/// Factory for creating embedders
#[derive(Debug)]
pub struct EmbedderFactory;

impl EmbedderFactory {
    pub fn create(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>, DomainError> {
        config.validate()?;

        match config.provider {
            EmbeddingProviderType::Hashing => {
                let embedder = HashingEmbedder::new(config.dimensions)?
                    .with_max_input_chars(config.max_input_chars);
                Ok(Arc::new(embedder))
            }
            EmbeddingProviderType::OpenAi => {
                let client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))
                    .map_err(|e| DomainError::configuration(e.to_string()))?;
                let embedder = OpenAiEmbedder::with_base_url(
                    client,
                    config.api_key.clone(),
                    config.base_url.clone(),
                    config.model.clone(),
                    config.dimensions,
                )
                .with_max_input_chars(config.max_input_chars)
                .with_request_dimensions(config.request_dimensions);
                Ok(Arc::new(embedder))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_hashing() {
        let embedder = EmbedderFactory::create(&EmbeddingConfig::default()).unwrap();

        assert_eq!(embedder.name(), "hashing");
        assert_eq!(embedder.dimensions(), DEFAULT_HASHING_DIMENSIONS);
    }

    #[test]
    fn test_create_openai() {
        let config: EmbeddingConfig = serde_json::from_value(serde_json::json!({
            "provider": "openai",
            "dimensions": 768,
            "model": "nomic-embed-text",
            "base_url": "http://localhost:11434"
        }))
        .unwrap();

        let embedder = EmbedderFactory::create(&config).unwrap();

        assert_eq!(embedder.name(), "openai");
        assert_eq!(embedder.dimensions(), 768);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let config = EmbeddingConfig {
            dimensions: 0,
            ..Default::default()
        };

        assert!(matches!(
            EmbedderFactory::create(&config),
            Err(DomainError::Configuration { .. })
        ));
    }
}
