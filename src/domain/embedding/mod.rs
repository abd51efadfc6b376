//! Embedding domain models and traits

mod embedder;
mod similarity;

pub use embedder::{check_embed_input, Embedder};
pub use similarity::{dot, l2_normalize};

#[cfg(test)]
pub use embedder::mock::MockEmbedder;
