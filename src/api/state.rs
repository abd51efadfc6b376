//! Shared state handed to every handler

use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::services::{AnswerService, KnowledgeManager};

/// Model names reported by `/api/v1/stats`
#[derive(Debug, Clone, Default)]
pub struct ModelInfo {
    pub generation_model: String,
    pub embedding_model: String,
}

#[derive(Clone)]
pub struct AppState {
    pub knowledge: Arc<KnowledgeManager>,
    pub answers: Arc<AnswerService>,
    pub models: Arc<ModelInfo>,
    /// Deadline for one chat answer
    pub ask_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(knowledge: Arc<KnowledgeManager>, answers: Arc<AnswerService>) -> Self {
        Self {
            knowledge,
            answers,
            models: Arc::new(ModelInfo::default()),
            ask_timeout: Duration::from_secs(60),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }

    pub fn with_models(mut self, models: ModelInfo) -> Self {
        self.models = Arc::new(models);
        self
    }

    pub fn with_ask_timeout(mut self, timeout: Duration) -> Self {
        self.ask_timeout = timeout;
        self
    }

    pub fn with_max_upload_bytes(mut self, max_bytes: usize) -> Self {
        self.max_upload_bytes = max_bytes;
        self
    }
}
