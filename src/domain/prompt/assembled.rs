//! Assembled generation prompt

use serde::Serialize;

use crate::domain::conversation::ConversationTurn;
use crate::domain::llm::Message;

pub const SYSTEM_HEADER: &str = "### SYSTEM\n";
pub const CONTEXT_HEADER: &str = "\n\n### CONTEXT\n";
pub const HISTORY_HEADER: &str = "\n\n### HISTORY\n";
pub const QUESTION_HEADER: &str = "\n\n### QUESTION\n";

/// Body of a rendered section with nothing in it
pub const EMPTY_SECTION: &str = "(none)";

/// A snippet placed in the prompt, numbered from 1
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextSnippet {
    pub number: usize,
    pub text: String,
}

impl ContextSnippet {
    /// The line this snippet occupies in the context block
    pub fn line(number: usize, text: &str) -> String {
        format!("[{}] {}\n", number, text)
    }
}

/// Bounded prompt ready for a generation backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledPrompt {
    system_instructions: String,
    context: Vec<ContextSnippet>,
    history: Vec<ConversationTurn>,
    query: String,
    sources: Vec<String>,
    estimated_tokens: usize,
}

impl AssembledPrompt {
    pub fn new(system_instructions: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            system_instructions: system_instructions.into(),
            context: Vec::new(),
            history: Vec::new(),
            query: query.into(),
            sources: Vec::new(),
            estimated_tokens: 0,
        }
    }

    /// Add a snippet; `source` is the original retrieved text
    pub fn push_context(&mut self, text: impl Into<String>, source: impl Into<String>) {
        let number = self.context.len() + 1;
        self.context.push(ContextSnippet {
            number,
            text: text.into(),
        });
        self.sources.push(source.into());
    }

    /// Set history, oldest turn first
    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_estimated_tokens(mut self, tokens: usize) -> Self {
        self.estimated_tokens = tokens;
        self
    }

    pub fn system_instructions(&self) -> &str {
        &self.system_instructions
    }

    pub fn context(&self) -> &[ContextSnippet] {
        &self.context
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Retrieved texts that made it into the prompt, in rank order
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn estimated_tokens(&self) -> usize {
        self.estimated_tokens
    }

    /// Chat messages: system (instructions + context), history, then the query
    pub fn messages(&self) -> Vec<Message> {
        let mut system = self.system_instructions.clone();

        if !self.context.is_empty() {
            system.push_str("\n\n<context>\n");
            for snippet in &self.context {
                system.push_str(&ContextSnippet::line(snippet.number, &snippet.text));
            }
            system.push_str("</context>");
        }

        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(Message::system(system));
        messages.extend(self.history.iter().map(ConversationTurn::to_message));
        messages.push(Message::user(self.query.clone()));
        messages
    }

    /// Single-string form with explicit section delimiters
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str(SYSTEM_HEADER);
        out.push_str(&self.system_instructions);

        out.push_str(CONTEXT_HEADER);
        if self.context.is_empty() {
            out.push_str(EMPTY_SECTION);
        } else {
            for snippet in &self.context {
                out.push_str(&ContextSnippet::line(snippet.number, &snippet.text));
            }
        }

        out.push_str(HISTORY_HEADER);
        if self.history.is_empty() {
            out.push_str(EMPTY_SECTION);
        } else {
            for turn in &self.history {
                out.push_str(&history_line(turn));
            }
        }

        out.push_str(QUESTION_HEADER);
        out.push_str(&self.query);
        out
    }
}

/// The line a history turn occupies in the rendered prompt
pub fn history_line(turn: &ConversationTurn) -> String {
    format!("{}: {}\n", turn.role.as_str(), turn.content)
}
