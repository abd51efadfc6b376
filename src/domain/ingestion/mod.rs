//! Document chunking domain types and traits

pub mod chunker;

pub use chunker::{helpers, Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};

#[cfg(test)]
pub use chunker::mock::MockChunkingStrategy;
