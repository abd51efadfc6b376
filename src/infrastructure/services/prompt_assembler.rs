//! Budgeted prompt assembly

use tracing::debug;

use crate::domain::conversation::ConversationTurn;
use crate::domain::ingestion::helpers::truncate_chars;
use crate::domain::prompt::{
    estimate_tokens, history_line, AssembledPrompt, ContextSnippet, PromptConfig,
    CONTEXT_HEADER, EMPTY_SECTION, HISTORY_HEADER, QUESTION_HEADER, SYSTEM_HEADER,
};
use crate::domain::retrieval::RetrievalResult;
use crate::domain::DomainError;

const ELLIPSIS: char = '…';

/// Fits instructions, retrieved context and history into a token limit.
///
/// Priority is fixed: instructions and the question always go in, then
/// context in rank order, then the most recent history. A snippet that does
/// not fit ends the context section; lower-ranked snippets are never used to
/// fill the gap.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    config: PromptConfig,
}

impl PromptAssembler {
    pub fn new(config: PromptConfig) -> Result<Self, DomainError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PromptConfig {
        &self.config
    }

    pub fn assemble(
        &self,
        history: &[ConversationTurn],
        retrieved: &[RetrievalResult],
        query: &str,
        max_tokens: usize,
    ) -> Result<AssembledPrompt, DomainError> {
        if query.trim().is_empty() {
            return Err(DomainError::invalid_argument("Query cannot be empty"));
        }

        let unit = self.config.budget_unit;
        let system = self.config.system_instructions.as_str();

        let fixed_text = [
            SYSTEM_HEADER,
            system,
            CONTEXT_HEADER,
            HISTORY_HEADER,
            QUESTION_HEADER,
            query,
        ]
        .concat();
        // an empty section still renders its marker
        let marker = unit.cost(EMPTY_SECTION);
        let fixed_cost = unit.cost(&fixed_text) + 2 * marker;
        let limit = unit.from_tokens(max_tokens);

        if fixed_cost > limit {
            return Err(DomainError::invalid_argument(format!(
                "Instructions and question need {} of a {} budget",
                fixed_cost, limit
            )));
        }

        let available = limit - fixed_cost;
        let mut prompt = AssembledPrompt::new(system, query);

        let context_cap = self.config.context_budget.min(available + marker);
        let mut context_used = 0;

        for result in retrieved {
            let text = self.clip_snippet(&result.text);
            let line = ContextSnippet::line(prompt.context().len() + 1, &text);
            let cost = unit.cost(&line);

            if context_used + cost > context_cap {
                break;
            }

            context_used += cost;
            prompt.push_context(text, result.text.clone());
        }

        let context_extra = context_used.saturating_sub(marker);
        let history_cap = self
            .config
            .history_budget
            .min(available - context_extra + marker);
        let mut history_used = 0;
        let mut kept = Vec::new();

        for turn in history.iter().rev().take(self.config.max_history_turns) {
            let line = history_line(turn);
            let cost = unit.cost(&line);

            if history_used + cost > history_cap {
                break;
            }

            history_used += cost;
            kept.push(turn.clone());
        }
        kept.reverse();

        let prompt = prompt.with_history(kept);
        let estimated = estimate_tokens(&prompt.render());

        debug!(
            snippets = prompt.context().len(),
            snippets_offered = retrieved.len(),
            history_turns = prompt.history().len(),
            estimated_tokens = estimated,
            "Prompt assembled"
        );

        Ok(prompt.with_estimated_tokens(estimated))
    }

    fn clip_snippet(&self, text: &str) -> String {
        let max_chars = self.config.snippet_max_chars;

        if text.chars().count() <= max_chars {
            return text.to_string();
        }

        let mut clipped = truncate_chars(text, max_chars.saturating_sub(1))
            .trim_end()
            .to_string();
        clipped.push(ELLIPSIS);
        clipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge::{EntryId, Metadata};
    use crate::domain::prompt::BudgetUnit;

    fn result(rank: usize, text: &str) -> RetrievalResult {
        RetrievalResult {
            entry_id: EntryId::new(format!("e{}", rank)).unwrap(),
            text: text.to_string(),
            score: 1.0 - rank as f32 * 0.1,
            rank,
            metadata: Metadata::new(),
        }
    }

    fn chars_config() -> PromptConfig {
        PromptConfig::default()
            .with_system_instructions("Sys.")
            .with_budget_unit(BudgetUnit::Characters)
    }

    /// Character cost of instructions "Sys." plus all delimiters and `query`
    fn fixed_chars(query: &str) -> usize {
        [SYSTEM_HEADER, "Sys.", CONTEXT_HEADER, HISTORY_HEADER, QUESTION_HEADER, query]
            .concat()
            .chars()
            .count()
    }

    fn marker_chars() -> usize {
        EMPTY_SECTION.chars().count()
    }

    #[test]
    fn test_everything_fits() {
        let assembler = PromptAssembler::new(PromptConfig::default()).unwrap();
        let history = vec![ConversationTurn::user("Hi"), ConversationTurn::assistant("Hello!")];
        let retrieved = vec![result(1, "The sky is blue"), result(2, "Grass is green")];

        let prompt = assembler
            .assemble(&history, &retrieved, "What color is the sky?", 4096)
            .unwrap();

        assert_eq!(prompt.context().len(), 2);
        assert_eq!(prompt.context()[0].text, "The sky is blue");
        assert_eq!(prompt.history().len(), 2);
        assert_eq!(prompt.history()[0].content, "Hi");
        assert_eq!(prompt.sources().len(), 2);
        assert!(prompt.estimated_tokens() > 0);
    }

    #[test]
    fn test_fixed_cost_over_limit_fails() {
        let assembler = PromptAssembler::new(PromptConfig::default()).unwrap();

        let result = assembler.assemble(&[], &[], "What color is the sky?", 5);

        assert!(matches!(result, Err(DomainError::InvalidArgument { .. })));
    }

    #[test]
    fn test_empty_query_rejected() {
        let assembler = PromptAssembler::new(PromptConfig::default()).unwrap();

        assert!(assembler.assemble(&[], &[], " ", 4096).is_err());
    }

    #[test]
    fn test_budget_drops_whole_lower_ranked_snippets() {
        let line_cost = ContextSnippet::line(1, "aaaaaaaaaa").chars().count();
        let assembler = PromptAssembler::new(
            chars_config().with_context_budget(line_cost * 2),
        )
        .unwrap();
        let retrieved = vec![
            result(1, "aaaaaaaaaa"),
            result(2, "bbbbbbbbbb"),
            result(3, "cccccccccc"),
        ];

        let prompt = assembler.assemble(&[], &retrieved, "q", 10_000).unwrap();

        let texts: Vec<&str> = prompt.context().iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["aaaaaaaaaa", "bbbbbbbbbb"]);
    }

    #[test]
    fn test_first_misfit_stops_context() {
        let small = ContextSnippet::line(1, "short").chars().count();
        let assembler =
            PromptAssembler::new(chars_config().with_context_budget(small * 2)).unwrap();
        let retrieved = vec![
            result(1, "short"),
            result(2, &"x".repeat(200)),
            result(3, "tiny"),
        ];

        let prompt = assembler.assemble(&[], &retrieved, "q", 10_000).unwrap();

        assert_eq!(prompt.context().len(), 1);
        assert_eq!(prompt.sources(), &["short".to_string()]);
    }

    #[test]
    fn test_max_tokens_bounds_context() {
        let assembler = PromptAssembler::new(chars_config()).unwrap();
        let fixed = fixed_chars("q");
        let line = ContextSnippet::line(1, "0123456789").chars().count();
        // room for exactly one snippet line next to the empty history marker
        let max_tokens = (fixed + line + marker_chars()).div_ceil(4);
        let retrieved = vec![result(1, "0123456789"), result(2, "0123456789")];

        let prompt = assembler.assemble(&[], &retrieved, "q", max_tokens).unwrap();

        assert_eq!(prompt.context().len(), 1);
    }

    #[test]
    fn test_snippets_clipped_with_ellipsis() {
        let assembler =
            PromptAssembler::new(chars_config().with_snippet_max_chars(10)).unwrap();
        let retrieved = vec![result(1, "ééééé ééééé ééééé")];

        let prompt = assembler.assemble(&[], &retrieved, "q", 10_000).unwrap();

        let text = &prompt.context()[0].text;
        assert!(text.ends_with('…'));
        assert!(text.chars().count() <= 10);
        assert_eq!(prompt.sources()[0], "ééééé ééééé ééééé");
    }

    #[test]
    fn test_history_most_recent_kept_in_order() {
        let assembler =
            PromptAssembler::new(chars_config().with_max_history_turns(2)).unwrap();
        let history = vec![
            ConversationTurn::user("one"),
            ConversationTurn::assistant("two"),
            ConversationTurn::user("three"),
        ];

        let prompt = assembler.assemble(&history, &[], "q", 10_000).unwrap();

        let contents: Vec<&str> = prompt.history().iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["two", "three"]);
    }

    #[test]
    fn test_history_cut_before_context() {
        let fixed = fixed_chars("q");
        let line = ContextSnippet::line(1, "context").chars().count();
        let assembler = PromptAssembler::new(chars_config()).unwrap();
        let history = vec![ConversationTurn::user("an old message")];
        let retrieved = vec![result(1, "context")];

        // leaves at most 4 characters beyond the snippet and the history marker
        let max_tokens = (fixed + line + marker_chars()) / 4 + 1;
        let prompt = assembler
            .assemble(&history, &retrieved, "q", max_tokens)
            .unwrap();

        assert_eq!(prompt.context().len(), 1);
        assert!(prompt.history().is_empty());
    }

    #[test]
    fn test_history_budget_respected() {
        let line = history_line(&ConversationTurn::user("abc")).chars().count();
        let assembler =
            PromptAssembler::new(chars_config().with_history_budget(line)).unwrap();
        let history = vec![ConversationTurn::user("abc"), ConversationTurn::user("abc")];

        let prompt = assembler.assemble(&history, &[], "q", 10_000).unwrap();

        assert_eq!(prompt.history().len(), 1);
    }

    #[test]
    fn test_empty_retrieval_gives_no_context() {
        let assembler = PromptAssembler::new(PromptConfig::default()).unwrap();

        let prompt = assembler.assemble(&[], &[], "Hello", 4096).unwrap();

        assert!(prompt.context().is_empty());
        assert!(prompt.render().contains("### CONTEXT\n(none)"));
    }

    #[test]
    fn test_empty_section_markers_count_against_budget() {
        let assembler = PromptAssembler::new(chars_config()).unwrap();

        let without_markers = fixed_chars("q").div_ceil(4);
        assert!(assembler.assemble(&[], &[], "q", without_markers).is_err());

        let max_tokens = (fixed_chars("q") + 2 * marker_chars()).div_ceil(4);
        let prompt = assembler.assemble(&[], &[], "q", max_tokens).unwrap();

        assert!(prompt.render().chars().count() <= max_tokens * 4);
    }

    #[test]
    fn test_rendered_prompt_never_exceeds_limit() {
        let assembler = PromptAssembler::new(chars_config()).unwrap();
        let history = vec![
            ConversationTurn::user("Hi there"),
            ConversationTurn::assistant("Hello! How can I help?"),
        ];
        let retrieved = vec![
            result(1, "The sky is blue"),
            result(2, "Paris is the capital of France"),
        ];
        let smallest = (fixed_chars("q") + 2 * marker_chars()).div_ceil(4);

        for max_tokens in smallest..smallest + 40 {
            let prompt = assembler
                .assemble(&history, &retrieved, "q", max_tokens)
                .unwrap();

            assert!(
                prompt.render().chars().count() <= max_tokens * 4,
                "over budget at {} tokens",
                max_tokens
            );
            assert!(prompt.estimated_tokens() <= max_tokens);
        }
    }
}
