//! Question answering - retrieval, prompt assembly and generation

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::prompt_assembler::PromptAssembler;
use super::retriever::Retriever;
use crate::domain::conversation::ConversationTurn;
use crate::domain::generation::GenerationBackend;
use crate::domain::retrieval::Answer;
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_answer, record_generation};

/// Per-question limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    /// Snippets requested from the retriever
    pub top_k: usize,
    /// Upper bound on the assembled prompt
    pub max_prompt_tokens: usize,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            max_prompt_tokens: 2_048,
        }
    }
}

impl AnswerConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.top_k == 0 {
            return Err(DomainError::configuration(
                "retrieval.top_k must be greater than 0",
            ));
        }
        if self.max_prompt_tokens == 0 {
            return Err(DomainError::configuration(
                "retrieval.max_prompt_tokens must be greater than 0",
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct AnswerService {
    retriever: Arc<Retriever>,
    assembler: PromptAssembler,
    backend: Arc<dyn GenerationBackend>,
    config: AnswerConfig,
}

impl AnswerService {
    pub fn new(
        retriever: Arc<Retriever>,
        assembler: PromptAssembler,
        backend: Arc<dyn GenerationBackend>,
        config: AnswerConfig,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        Ok(Self {
            retriever,
            assembler,
            backend,
            config,
        })
    }

    pub fn config(&self) -> &AnswerConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Answer a question from the knowledge base and the conversation so far.
    ///
    /// An empty knowledge base still produces an answer, generated without
    /// context. Failures are returned as-is; nothing is retried.
    pub async fn ask(
        &self,
        query: &str,
        history: &[ConversationTurn],
    ) -> Result<Answer, DomainError> {
        let result = self.answer(query, history).await;
        record_answer(answer_status(&result));
        result
    }

    /// [`ask`](Self::ask) bounded by a deadline covering the whole pipeline
    pub async fn ask_with_timeout(
        &self,
        query: &str,
        history: &[ConversationTurn],
        timeout: Duration,
    ) -> Result<Answer, DomainError> {
        match tokio::time::timeout(timeout, self.answer(query, history)).await {
            Ok(result) => {
                record_answer(answer_status(&result));
                result
            }
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Answer timed out");
                record_answer("timeout");
                Err(DomainError::timeout("ask", timeout))
            }
        }
    }

    async fn answer(
        &self,
        query: &str,
        history: &[ConversationTurn],
    ) -> Result<Answer, DomainError> {
        let retrieved = self.retriever.retrieve(query, self.config.top_k).await?;

        if retrieved.is_empty() {
            debug!("No relevant knowledge found, answering without context");
        }

        let prompt =
            self.assembler
                .assemble(history, &retrieved, query, self.config.max_prompt_tokens)?;

        let started = Instant::now();
        let response = self.backend.complete(&prompt).await;
        let elapsed = started.elapsed();
        record_generation(self.backend.name(), elapsed);

        let response = response?;

        info!(
            backend = self.backend.name(),
            sources = prompt.sources().len(),
            estimated_tokens = prompt.estimated_tokens(),
            generation_ms = elapsed.as_millis() as u64,
            "Answer generated"
        );

        Ok(Answer::new(response, prompt.sources().to_vec()))
    }
}

/// `status` label for `rag_answers_total`; backend failures are told apart
/// from bad input
fn answer_status(result: &Result<Answer, DomainError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(e) if e.is_transient() => "upstream_error",
        Err(_) => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::Embedder;
    use crate::domain::generation::mock::ScriptedGenerationBackend;
    use crate::domain::knowledge::{KnowledgeStore, NewKnowledgeEntry};
    use crate::domain::prompt::PromptConfig;
    use crate::domain::vector_index::VectorIndex;
    use crate::infrastructure::embedding::HashingEmbedder;
    use crate::infrastructure::generation::MockGenerationBackend;
    use crate::infrastructure::knowledge_store::InMemoryKnowledgeStore;
    use crate::infrastructure::vector_index::InMemoryVectorIndex;

    async fn retriever(texts: &[&str]) -> Arc<Retriever> {
        let embedder = Arc::new(HashingEmbedder::default());
        let store = Arc::new(InMemoryKnowledgeStore::new());
        let index = Arc::new(InMemoryVectorIndex::new(embedder.dimensions()));

        for text in texts {
            let id = store.put(NewKnowledgeEntry::new(*text)).await.unwrap();
            index.upsert(id, embedder.embed(text).await.unwrap()).await.unwrap();
        }

        Arc::new(Retriever::new(embedder, index, store).with_min_score(Some(0.3)))
    }

    fn service(retriever: Arc<Retriever>, backend: Arc<dyn GenerationBackend>) -> AnswerService {
        AnswerService::new(
            retriever,
            PromptAssembler::new(PromptConfig::default()).unwrap(),
            backend,
            AnswerConfig::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_answer_cites_best_match_first() {
        let backend = Arc::new(ScriptedGenerationBackend::new("Blue."));
        let service = service(
            retriever(&["The sky is blue", "Paris is the capital of France"]).await,
            backend.clone(),
        );

        let answer = service.ask("What color is the sky?", &[]).await.unwrap();

        assert_eq!(answer.response, "Blue.");
        assert_eq!(answer.sources[0], "The sky is blue");
        let prompts = backend.prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].context()[0].text, "The sky is blue");
    }

    #[tokio::test]
    async fn test_empty_store_still_answers() {
        let service = service(retriever(&[]).await, Arc::new(MockGenerationBackend::new()));

        let answer = service.ask("Who are you?", &[]).await.unwrap();

        assert!(answer.sources.is_empty());
        assert!(answer.response.starts_with("I'm JARVIS"));
    }

    #[tokio::test]
    async fn test_history_reaches_backend() {
        let backend = Arc::new(ScriptedGenerationBackend::new("ok"));
        let service = service(retriever(&[]).await, backend.clone());
        let history = vec![
            ConversationTurn::user("My name is Tony"),
            ConversationTurn::assistant("Nice to meet you, Tony"),
        ];

        service.ask("What is my name?", &history).await.unwrap();

        assert_eq!(backend.prompts()[0].history().len(), 2);
    }

    #[tokio::test]
    async fn test_generation_failure_surfaces() {
        let backend = Arc::new(ScriptedGenerationBackend::new("").with_error("model crashed"));
        let service = service(retriever(&["The sky is blue"]).await, backend);

        let result = service.ask("What color is the sky?", &[]).await;

        assert!(matches!(result, Err(DomainError::Generation { .. })));
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let service = service(retriever(&[]).await, Arc::new(MockGenerationBackend::new()));

        assert!(matches!(
            service.ask("   ", &[]).await,
            Err(DomainError::InvalidArgument { .. })
        ));
    }

    #[tokio::test]
    async fn test_ask_with_timeout_expires() {
        let backend = Arc::new(
            ScriptedGenerationBackend::new("late").with_delay(Duration::from_millis(200)),
        );
        let service = service(retriever(&[]).await, backend);

        let result = service
            .ask_with_timeout("hello", &[], Duration::from_millis(20))
            .await;

        assert!(matches!(result, Err(DomainError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_ask_with_timeout_completes_in_time() {
        let service = service(retriever(&[]).await, Arc::new(MockGenerationBackend::new()));

        let answer = service
            .ask_with_timeout("hello", &[], Duration::from_secs(5))
            .await
            .unwrap();

        assert!(!answer.response.is_empty());
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let config = AnswerConfig {
            top_k: 0,
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_answer_status_labels() {
        let ok = Ok(Answer::new("Blue.", vec![]));
        let upstream = Err(DomainError::generation("live", "503 Service Unavailable"));
        let invalid = Err(DomainError::invalid_argument("Query cannot be empty"));

        assert_eq!(answer_status(&ok), "success");
        assert_eq!(answer_status(&upstream), "upstream_error");
        assert_eq!(answer_status(&invalid), "error");
    }
}
