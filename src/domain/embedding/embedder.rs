//! Embedder trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Maps text to a fixed-length vector.
///
/// Identical input must produce an identical vector for the lifetime of the
/// process, and every vector has exactly `dimensions()` components.
#[async_trait]
pub trait Embedder: Send + Sync + Debug {
    /// Embed a single text. Fails with `Embedding` on blank or oversized input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Length of every produced vector
    fn dimensions(&self) -> usize;

    /// Longest accepted input, in characters
    fn max_input_chars(&self) -> usize;

    /// Embedder name for stats and logs
    fn name(&self) -> &'static str;
}

/// Reject blank or oversized input before it reaches a backend
pub fn check_embed_input(name: &str, text: &str, max_chars: usize) -> Result<(), DomainError> {
    if text.trim().is_empty() {
        return Err(DomainError::embedding(name, "Cannot embed empty text"));
    }

    let chars = text.chars().count();
    if chars > max_chars {
        return Err(DomainError::embedding(
            name,
            format!("Input of {} characters exceeds limit of {}", chars, max_chars),
        ));
    }

    Ok(())
}
