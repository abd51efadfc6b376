//! Paragraph-based chunking strategy

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::ingestion::{helpers, Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
use crate::domain::DomainError;

static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n\s*\r?\n").unwrap());

const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Splits on blank lines, then packs paragraphs up to the target size.
///
/// Oversized paragraphs are cut at the last whitespace before `max_size`, and
/// a short trailing chunk is folded into its predecessor when it fits. No
/// overlap between chunks.
#[derive(Debug, Clone, Default)]
pub struct ParagraphChunker;

impl ParagraphChunker {
    pub fn new() -> Self {
        Self
    }

    fn split_paragraphs(text: &str) -> Vec<&str> {
        BLANK_LINE
            .split(text)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// Cut a paragraph into pieces of at most `max_chars` characters
    fn hard_split(paragraph: &str, max_chars: usize) -> Vec<&str> {
        let mut pieces = Vec::new();
        let mut rest = paragraph;

        while rest.chars().count() > max_chars {
            let idx = helpers::split_point(rest, max_chars);
            let head = rest[..idx].trim_end();
            if !head.is_empty() {
                pieces.push(head);
            }
            rest = rest[idx..].trim_start();
        }

        if !rest.is_empty() {
            pieces.push(rest);
        }

        pieces
    }

    fn joined_len(current: &str, next: &str) -> usize {
        current.chars().count() + PARAGRAPH_SEPARATOR.len() + next.chars().count()
    }

    fn merge(pieces: Vec<&str>, target_size: usize) -> Vec<String> {
        let mut merged = Vec::new();
        let mut current = String::new();

        for piece in pieces {
            if current.is_empty() {
                current.push_str(piece);
            } else if Self::joined_len(&current, piece) <= target_size {
                current.push_str(PARAGRAPH_SEPARATOR);
                current.push_str(piece);
            } else {
                merged.push(std::mem::take(&mut current));
                current.push_str(piece);
            }
        }

        if !current.is_empty() {
            merged.push(current);
        }

        merged
    }
}

impl ChunkingStrategy for ParagraphChunker {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError> {
        config.validate()?;

        let pieces: Vec<&str> = Self::split_paragraphs(content)
            .into_iter()
            .flat_map(|p| Self::hard_split(p, config.max_size))
            .collect();

        let mut texts = Self::merge(pieces, config.target_size);

        if texts.len() >= 2 {
            let last = &texts[texts.len() - 1];
            let prev = &texts[texts.len() - 2];
            if last.chars().count() < config.min_size
                && Self::joined_len(prev, last) <= config.max_size
            {
                if let Some(last) = texts.pop() {
                    if let Some(prev) = texts.last_mut() {
                        prev.push_str(PARAGRAPH_SEPARATOR);
                        prev.push_str(&last);
                    }
                }
            }
        }

        let total = texts.len();
        Ok(texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| {
                let hash = helpers::content_hash(&text);
                Chunk::new(text, ChunkMetadata::new(index, total, hash))
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "paragraph"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.content.as_str()).collect()
    }

    #[test]
    fn test_empty_content() {
        let chunker = ParagraphChunker::new();

        assert!(chunker.chunk("", &ChunkingConfig::default()).unwrap().is_empty());
        assert!(chunker.chunk(" \n\n \n", &ChunkingConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn test_single_paragraph() {
        let chunker = ParagraphChunker::new();

        let chunks = chunker
            .chunk("  This is a single paragraph.  ", &ChunkingConfig::default())
            .unwrap();

        assert_eq!(contents(&chunks), vec!["This is a single paragraph."]);
        assert_eq!(chunks[0].metadata.total_chunks, 1);
    }

    #[test]
    fn test_blank_lines_with_whitespace_separate_paragraphs() {
        let chunker = ParagraphChunker::new();
        let config = ChunkingConfig::new(10, 1, 20);

        let chunks = chunker.chunk("Para one.\n   \n\n\nPara two.", &config).unwrap();

        assert_eq!(contents(&chunks), vec!["Para one.", "Para two."]);
    }

    #[test]
    fn test_paragraphs_merge_up_to_target() {
        let chunker = ParagraphChunker::new();
        let config = ChunkingConfig::new(30, 1, 60);

        let content = "First paragraph.\n\nSecond one.\n\nThird paragraph here.";
        let chunks = chunker.chunk(content, &config).unwrap();

        assert_eq!(
            contents(&chunks),
            vec!["First paragraph.\n\nSecond one.", "Third paragraph here."]
        );
    }

    #[test]
    fn test_long_paragraph_hard_split_at_whitespace() {
        let chunker = ParagraphChunker::new();
        let config = ChunkingConfig::new(10, 1, 12);

        let chunks = chunker.chunk("alpha beta gamma delta epsilon", &config).unwrap();

        assert_eq!(
            contents(&chunks),
            vec!["alpha beta", "gamma delta", "epsilon"]
        );
        assert!(chunks.iter().all(|c| c.char_len() <= 12));
    }

    #[test]
    fn test_hard_split_mid_word_without_whitespace() {
        let chunker = ParagraphChunker::new();
        let config = ChunkingConfig::new(4, 1, 4);

        let chunks = chunker.chunk("abcdefghij", &config).unwrap();

        assert_eq!(contents(&chunks), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_hard_split_multibyte() {
        let chunker = ParagraphChunker::new();
        let config = ChunkingConfig::new(3, 1, 3);

        let chunks = chunker.chunk("ééééé", &config).unwrap();

        assert_eq!(contents(&chunks), vec!["ééé", "éé"]);
    }

    #[test]
    fn test_short_trailing_chunk_folded() {
        let chunker = ParagraphChunker::new();
        let config = ChunkingConfig::new(20, 5, 40);

        let content = "Twenty chars exactly\n\nEnd";
        let chunks = chunker.chunk(content, &config).unwrap();

        assert_eq!(contents(&chunks), vec!["Twenty chars exactly\n\nEnd"]);
    }

    #[test]
    fn test_short_trailing_chunk_kept_when_too_big_to_fold() {
        let chunker = ParagraphChunker::new();
        let config = ChunkingConfig::new(20, 5, 22);

        let content = "Twenty chars exactly\n\nEnd";
        let chunks = chunker.chunk(content, &config).unwrap();

        assert_eq!(contents(&chunks), vec!["Twenty chars exactly", "End"]);
    }

    #[test]
    fn test_every_chunk_within_max() {
        let chunker = ParagraphChunker::new();
        let config = ChunkingConfig::new(50, 10, 80);

        let content = (0..40)
            .map(|i| format!("Sentence number {} talks about topic {}.", i, i % 7))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = chunker.chunk(&content, &config).unwrap();

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.char_len() <= 80));
    }

    #[test]
    fn test_deterministic_with_metadata() {
        let chunker = ParagraphChunker::new();
        let config = ChunkingConfig::new(30, 5, 60);
        let content = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";

        let a = chunker.chunk(content, &config).unwrap();
        let b = chunker.chunk(content, &config).unwrap();

        assert_eq!(a, b);
        for (i, chunk) in a.iter().enumerate() {
            assert_eq!(chunk.metadata.chunk_index, i);
            assert_eq!(chunk.metadata.total_chunks, a.len());
            assert_eq!(chunk.metadata.content_hash, helpers::content_hash(&chunk.content));
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let chunker = ParagraphChunker::new();

        let result = chunker.chunk("text", &ChunkingConfig::new(10, 20, 30));

        assert!(matches!(result, Err(DomainError::InvalidArgument { .. })));
    }

    #[test]
    fn test_name() {
        assert_eq!(ParagraphChunker::new().name(), "paragraph");
    }
}
