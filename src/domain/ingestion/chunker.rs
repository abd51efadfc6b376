//! Chunking strategy trait and types

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::knowledge::Metadata;
use crate::domain::DomainError;

/// Chunk size limits, in characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Size merged chunks grow towards
    pub target_size: usize,
    /// A trailing chunk shorter than this is folded into its predecessor
    pub min_size: usize,
    /// Hard upper bound on every chunk
    pub max_size: usize,
}

impl ChunkingConfig {
    pub fn new(target_size: usize, min_size: usize, max_size: usize) -> Self {
        Self {
            target_size,
            min_size,
            max_size,
        }
    }

    /// Requires `0 < min_size <= target_size <= max_size`
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.min_size == 0 {
            return Err(DomainError::invalid_argument(
                "min_size must be greater than 0",
            ));
        }

        if self.min_size > self.target_size {
            return Err(DomainError::invalid_argument(
                "min_size must be less than or equal to target_size",
            ));
        }

        if self.target_size > self.max_size {
            return Err(DomainError::invalid_argument(
                "target_size must be less than or equal to max_size",
            ));
        }

        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_size: 800,
            min_size: 100,
            max_size: 1500,
        }
    }
}

/// Position of a chunk within its source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Index of this chunk (0-based)
    pub chunk_index: usize,
    /// Total number of chunks
    pub total_chunks: usize,
    /// SHA-256 hex digest of the chunk text
    pub content_hash: String,
}

impl ChunkMetadata {
    pub fn new(chunk_index: usize, total_chunks: usize, content_hash: impl Into<String>) -> Self {
        Self {
            chunk_index,
            total_chunks,
            content_hash: content_hash.into(),
        }
    }

    /// Merge into entry metadata; chunk keys win over caller keys
    pub fn merge_into(&self, metadata: &mut Metadata) {
        metadata.insert("chunk_index".to_string(), self.chunk_index.into());
        metadata.insert("total_chunks".to_string(), self.total_chunks.into());
        metadata.insert("content_hash".to_string(), self.content_hash.clone().into());
    }
}

/// A chunk of text extracted from a document
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn new(content: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    pub fn index(&self) -> usize {
        self.metadata.chunk_index
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Trait for chunking strategies. Output must be a pure function of input.
pub trait ChunkingStrategy: Send + Sync + Debug {
    /// Split content into chunks
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError>;

    /// Get the strategy name
    fn name(&self) -> &'static str;
}

/// Helper functions for chunking
pub mod helpers {
    use sha2::{Digest, Sha256};

    /// Byte index of the split point for a prefix of at most `max_chars`
    /// characters: the last whitespace inside that prefix, or the prefix end
    /// if it contains none. Always on a char boundary.
    pub fn split_point(text: &str, max_chars: usize) -> usize {
        let limit = match text.char_indices().nth(max_chars) {
            Some((idx, _)) => idx,
            None => return text.len(),
        };

        text[..limit]
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(idx, _)| idx)
            .filter(|idx| *idx > 0)
            .unwrap_or(limit)
    }

    /// Truncate to at most `max_chars` characters on a char boundary
    pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
        match text.char_indices().nth(max_chars) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }

    /// SHA-256 hex digest of a chunk's text
    pub fn content_hash(text: &str) -> String {
        hex::encode(Sha256::digest(text.as_bytes()))
    }
}
