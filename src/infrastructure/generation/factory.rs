//! Generation backend selection

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use super::live::LiveGenerationBackend;
use super::mock::MockGenerationBackend;
use crate::domain::generation::GenerationBackend;
use crate::domain::DomainError;
use crate::infrastructure::llm::{HttpClient, OpenAiProvider};

/// Supported generation backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationBackendType {
    /// Canned replies, no model server needed
    #[default]
    Mock,
    /// OpenAI-compatible chat completions
    Live,
}

/// `generation` configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub backend: GenerationBackendType,
    pub model: String,
    pub base_url: String,
    pub api_key: String,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub timeout_secs: u64,
    /// Artificial latency of the mock backend
    pub mock_delay_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: GenerationBackendType::Mock,
            model: "llama2".to_string(),
            base_url: "http://localhost:11434".to_string(),
            api_key: String::new(),
            temperature: Some(0.7),
            max_output_tokens: None,
            timeout_secs: 120,
            mock_delay_ms: 0,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.backend == GenerationBackendType::Live {
            if self.model.trim().is_empty() {
                return Err(DomainError::configuration(
                    "generation.model is required for the live backend",
                ));
            }
            if self.base_url.trim().is_empty() {
                return Err(DomainError::configuration(
                    "generation.base_url is required for the live backend",
                ));
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(DomainError::configuration(
                    "generation.temperature must be between 0 and 2",
                ));
            }
        }

        Ok(())
    }
}

/// Factory for creating generation backends
#[derive(Debug)]
pub struct GenerationBackendFactory;

impl GenerationBackendFactory {
    pub fn create(config: &GenerationConfig) -> Result<Arc<dyn GenerationBackend>, DomainError> {
        config.validate()?;

        match config.backend {
            GenerationBackendType::Mock => Ok(Arc::new(
                MockGenerationBackend::new().with_delay(Duration::from_millis(config.mock_delay_ms)),
            )),
            GenerationBackendType::Live => {
                let client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))
                    .map_err(|e| DomainError::configuration(e.to_string()))?;
                let provider = OpenAiProvider::with_base_url(
                    client,
                    config.api_key.clone(),
                    config.base_url.clone(),
                );

                let mut backend = LiveGenerationBackend::new(Arc::new(provider), config.model.clone());
                if let Some(temperature) = config.temperature {
                    backend = backend.with_temperature(temperature);
                }
                if let Some(max_tokens) = config.max_output_tokens {
                    backend = backend.with_max_tokens(max_tokens);
                }

                Ok(Arc::new(backend))
            }
        }
    }
}
