//! Generation through an OpenAI-compatible chat model

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::generation::GenerationBackend;
use crate::domain::llm::{FinishReason, LlmProvider, LlmRequest};
use crate::domain::prompt::AssembledPrompt;
use crate::domain::DomainError;

/// Sends the assembled message list to a chat model
#[derive(Debug)]
pub struct LiveGenerationBackend {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl LiveGenerationBackend {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Cap on generated tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, prompt: &AssembledPrompt) -> LlmRequest {
        let mut builder = LlmRequest::builder().messages(prompt.messages());

        if let Some(temperature) = self.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }

        builder.build()
    }
}

#[async_trait]
impl GenerationBackend for LiveGenerationBackend {
    async fn complete(&self, prompt: &AssembledPrompt) -> Result<String, DomainError> {
        let request = self.build_request(prompt);
        let response = self.provider.chat(&self.model, request).await?;

        if let Some(usage) = &response.usage {
            debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion finished"
            );
        }

        if response.finish_reason == Some(FinishReason::Length) {
            warn!(model = %self.model, "Generation stopped at the token limit");
        }

        let content = response.content().trim();
        if content.is_empty() {
            return Err(DomainError::generation(
                self.provider.provider_name(),
                "Model returned an empty reply",
            ));
        }

        Ok(content.to_string())
    }

    fn name(&self) -> &'static str {
        "live"
    }
}
