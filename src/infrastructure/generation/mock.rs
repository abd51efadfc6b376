//! Deterministic canned-reply backend for development

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::generation::GenerationBackend;
use crate::domain::prompt::AssembledPrompt;
use crate::domain::DomainError;

const CONTEXT_PREVIEW_CHARS: usize = 150;

const IDENTITY_TRIGGERS: [&str; 3] = ["who are you", "what are you", "introduce yourself"];
const CAPABILITY_TRIGGERS: [&str; 4] = ["what can you do", "capabilities", "features", "help"];
const QUESTION_PREFIXES: [&str; 5] = ["how ", "why ", "what ", "when ", "where "];

const IDENTITY_REPLY: &str = "I'm JARVIS, your personal AI assistant! I'm powered by a \
self-hosted large language model and use a vector database for intelligent knowledge retrieval. \
I can help you store, organize, and retrieve information through natural conversation. Think of \
me as your second brain - add knowledge to my database, and I'll help you recall and connect \
information whenever you need it!";

const CAPABILITIES_REPLY: &str = "I can help you with several things:\n\n\
1. 💬 Answer questions using RAG (Retrieval-Augmented Generation)\n\
2. 📚 Store and retrieve knowledge from a vector database\n\
3. 🔍 Find relevant information based on semantic similarity\n\
4. 📄 Process and understand uploaded documents\n\
5. 💡 Provide context-aware responses using your personal knowledge base\n\n\
To get started, try adding some knowledge through the Knowledge tab, then ask me questions about it!";

/// Mock backend answering from the prompt without any model.
///
/// Replies depend only on the query and the injected context, so answers are
/// reproducible across runs.
#[derive(Debug, Clone, Default)]
pub struct MockGenerationBackend {
    delay: Duration,
}

impl MockGenerationBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulated model latency
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn reply(prompt: &AssembledPrompt) -> String {
        let query = prompt.query();
        let lowered = query.to_lowercase();

        if let Some(first) = prompt.sources().first() {
            let preview: String = first.chars().take(CONTEXT_PREVIEW_CHARS).collect();
            return format!(
                "Based on the information in my knowledge base: '{}...', I can help you with that. \
                 {} I found {} relevant source(s) to answer your question. \
                 Would you like me to elaborate on any specific aspect?",
                preview,
                query,
                prompt.sources().len()
            );
        }

        if IDENTITY_TRIGGERS.iter().any(|t| lowered.contains(t)) {
            return IDENTITY_REPLY.to_string();
        }

        if CAPABILITY_TRIGGERS.iter().any(|t| lowered.contains(t)) {
            return CAPABILITIES_REPLY.to_string();
        }

        if QUESTION_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
            return format!(
                "That's a great question about '{}'. To provide you with the most accurate answer, \
                 I recommend adding relevant information to my knowledge base through the Knowledge tab. \
                 Once you do that, I'll be able to give you detailed, context-aware responses using \
                 retrieval-augmented generation. Would you like to know more about how my RAG system works?",
                query
            );
        }

        format!(
            "I understand you're asking about: '{}'. While I can engage in general conversation, \
             I work best when you've added relevant information to my knowledge base. This allows me \
             to provide accurate, context-specific answers using retrieval-augmented generation. \
             Try adding some documents or text in the Knowledge tab!",
            query
        )
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn complete(&self, prompt: &AssembledPrompt) -> Result<String, DomainError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(Self::reply(prompt))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
