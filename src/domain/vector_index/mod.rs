//! Vector index domain trait

mod index;

pub use index::{ScoredId, VectorIndex};

#[cfg(test)]
pub use index::mock::MockVectorIndex;
