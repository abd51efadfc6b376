//! Generation backend capability

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::prompt::AssembledPrompt;
use crate::domain::DomainError;

/// Turns an assembled prompt into answer text. Treated as a black box.
#[async_trait]
pub trait GenerationBackend: Send + Sync + Debug {
    /// Fails with `Generation` when the backend cannot produce text
    async fn complete(&self, prompt: &AssembledPrompt) -> Result<String, DomainError>;

    /// Backend name for logs and metrics
    fn name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Returns a fixed reply and records every prompt it receives
    #[derive(Debug, Default)]
    pub struct ScriptedGenerationBackend {
        reply: String,
        error: Option<String>,
        delay: Option<Duration>,
        prompts: Mutex<Vec<AssembledPrompt>>,
    }

    impl ScriptedGenerationBackend {
        pub fn new(reply: impl Into<String>) -> Self {
            Self {
                reply: reply.into(),
                ..Default::default()
            }
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn prompts(&self) -> Vec<AssembledPrompt> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedGenerationBackend {
        async fn complete(&self, prompt: &AssembledPrompt) -> Result<String, DomainError> {
            self.prompts.lock().unwrap().push(prompt.clone());

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if let Some(ref error) = self.error {
                return Err(DomainError::generation("scripted", error));
            }

            Ok(self.reply.clone())
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }
}
