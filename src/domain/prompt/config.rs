//! Prompt budget configuration

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Characters per token used by the token estimate
pub const CHARS_PER_TOKEN: usize = 4;

pub const DEFAULT_SYSTEM_INSTRUCTIONS: &str = "You are JARVIS, a helpful and intelligent AI assistant. \
You provide accurate, thoughtful responses based on the context provided. \
When context is given, use it to answer the question accurately and do not invent facts beyond it.";

/// Estimate the token count of a text as `ceil(chars / 4)`
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Unit in which prompt budgets are measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetUnit {
    Characters,
    #[default]
    Tokens,
}

impl BudgetUnit {
    /// Cost of a text in this unit
    pub fn cost(&self, text: &str) -> usize {
        match self {
            Self::Characters => text.chars().count(),
            Self::Tokens => estimate_tokens(text),
        }
    }

    /// Convert a token limit into this unit
    pub fn from_tokens(&self, tokens: usize) -> usize {
        match self {
            Self::Characters => tokens.saturating_mul(CHARS_PER_TOKEN),
            Self::Tokens => tokens,
        }
    }
}

/// Limits applied when assembling a generation prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub system_instructions: String,
    /// Each snippet is cut to this many characters before budgeting
    pub snippet_max_chars: usize,
    /// Upper bound for retrieved context, in `budget_unit`
    pub context_budget: usize,
    /// Upper bound for conversation history, in `budget_unit`
    pub history_budget: usize,
    pub budget_unit: BudgetUnit,
    pub max_history_turns: usize,
}

impl PromptConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.system_instructions.trim().is_empty() {
            return Err(DomainError::configuration(
                "prompt.system_instructions cannot be empty",
            ));
        }

        if self.snippet_max_chars == 0 {
            return Err(DomainError::configuration(
                "prompt.snippet_max_chars must be greater than 0",
            ));
        }

        Ok(())
    }

    pub fn with_system_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.system_instructions = instructions.into();
        self
    }

    pub fn with_snippet_max_chars(mut self, max_chars: usize) -> Self {
        self.snippet_max_chars = max_chars;
        self
    }

    pub fn with_context_budget(mut self, budget: usize) -> Self {
        self.context_budget = budget;
        self
    }

    pub fn with_history_budget(mut self, budget: usize) -> Self {
        self.history_budget = budget;
        self
    }

    pub fn with_budget_unit(mut self, unit: BudgetUnit) -> Self {
        self.budget_unit = unit;
        self
    }

    pub fn with_max_history_turns(mut self, turns: usize) -> Self {
        self.max_history_turns = turns;
        self
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_instructions: DEFAULT_SYSTEM_INSTRUCTIONS.to_string(),
            snippet_max_chars: 600,
            context_budget: 1_000,
            history_budget: 500,
            budget_unit: BudgetUnit::Tokens,
            max_history_turns: 6,
        }
    }
}
