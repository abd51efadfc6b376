//! Local feature-hashing embedder

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::domain::embedding::{check_embed_input, l2_normalize, Embedder};
use crate::domain::DomainError;

pub const DEFAULT_HASHING_DIMENSIONS: usize = 1024;
pub const DEFAULT_MAX_INPUT_CHARS: usize = 8_000;

/// Offline embedder: bag of lowercase tokens hashed into fixed buckets.
///
/// Captures lexical overlap only, which is enough for development, tests and
/// small personal notes without a model server.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
    max_input_chars: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Result<Self, DomainError> {
        if dimensions == 0 {
            return Err(DomainError::configuration(
                "Embedding dimensions must be greater than 0",
            ));
        }

        Ok(Self {
            dimensions,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        })
    }

    pub fn with_max_input_chars(mut self, max_chars: usize) -> Self {
        self.max_input_chars = max_chars;
        self
    }

    fn bucket(&self, token: &str) -> usize {
        let digest = Sha256::digest(token.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(bytes) % self.dimensions as u64) as usize
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_HASHING_DIMENSIONS,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        check_embed_input(self.name(), text, self.max_input_chars)?;

        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();

        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            vector[self.bucket(token)] += 1.0;
        }

        l2_normalize(&mut vector);
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }

    fn name(&self) -> &'static str {
        "hashing"
    }
}
