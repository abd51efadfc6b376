use serde::Deserialize;

use crate::domain::ingestion::ChunkingConfig;
use crate::domain::prompt::PromptConfig;
use crate::domain::DomainError;
use crate::infrastructure::embedding::EmbeddingConfig;
use crate::infrastructure::generation::GenerationConfig;
use crate::infrastructure::knowledge_store::StorageConfig;
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::services::AnswerConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub prompt: PromptConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub cors_origins: Vec<String>,
    /// Largest accepted upload body
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// `retrieval` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    /// Hits below this similarity are dropped; unset keeps all
    pub min_score: Option<f32>,
    pub max_prompt_tokens: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_secs: 60,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        let answer = AnswerConfig::default();
        Self {
            top_k: answer.top_k,
            min_score: Some(0.3),
            max_prompt_tokens: answer.max_prompt_tokens,
        }
    }
}

impl RetrievalConfig {
    pub fn answer_config(&self) -> AnswerConfig {
        AnswerConfig {
            top_k: self.top_k,
            max_prompt_tokens: self.max_prompt_tokens,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Cross-section checks that serde cannot express
    pub fn validate(&self) -> Result<(), DomainError> {
        self.embedding.validate()?;
        self.generation.validate()?;
        self.prompt.validate()?;
        self.retrieval.answer_config().validate()?;
        self.storage.postgres.validate()?;

        self.chunking
            .validate()
            .map_err(|e| DomainError::configuration(format!("chunking: {}", e)))?;

        if self.chunking.max_size > self.embedding.max_input_chars {
            return Err(DomainError::configuration(format!(
                "chunking.max_size ({}) must not exceed embedding.max_input_chars ({})",
                self.chunking.max_size, self.embedding.max_input_chars
            )));
        }

        if let Some(min_score) = self.retrieval.min_score {
            if !(-1.0..=1.0).contains(&min_score) {
                return Err(DomainError::configuration(
                    "retrieval.min_score must be between -1 and 1",
                ));
            }
        }

        if self.server.request_timeout_secs == 0 {
            return Err(DomainError::configuration(
                "server.request_timeout_secs must be greater than 0",
            ));
        }

        Ok(())
    }
}
