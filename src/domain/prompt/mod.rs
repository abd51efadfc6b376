//! Prompt assembly domain - budgets and the assembled prompt

mod assembled;
mod config;

pub use assembled::{
    history_line, AssembledPrompt, ContextSnippet, CONTEXT_HEADER, EMPTY_SECTION,
    HISTORY_HEADER, QUESTION_HEADER, SYSTEM_HEADER,
};
pub use config::{
    estimate_tokens, BudgetUnit, PromptConfig, CHARS_PER_TOKEN, DEFAULT_SYSTEM_INSTRUCTIONS,
};
