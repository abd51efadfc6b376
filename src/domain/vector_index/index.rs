//! Vector index trait

use std::cmp::Ordering;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::knowledge::EntryId;
use crate::domain::DomainError;

/// A search hit: entry ID plus cosine similarity in [-1, 1]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredId {
    pub id: EntryId,
    pub score: f32,
}

impl ScoredId {
    pub fn new(id: EntryId, score: f32) -> Self {
        Self { id, score }
    }

    /// Ordering for result lists: higher score first, then lower ID first
    pub fn ranking_order(a: &Self, b: &Self) -> Ordering {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Nearest-neighbour index over entry embeddings
#[async_trait]
pub trait VectorIndex: Send + Sync + Debug {
    /// Insert or replace the vector for an ID.
    /// `InvalidArgument` if the length differs from `dimensions()`.
    async fn upsert(&self, id: EntryId, embedding: Vec<f32>) -> Result<(), DomainError>;

    /// Remove an ID, returning whether it was present
    async fn remove(&self, id: &EntryId) -> Result<bool, DomainError>;

    /// Up to `k` IDs by descending similarity, ties broken by lower ID.
    /// `InvalidArgument` if `k == 0` or the query has the wrong length.
    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredId>, DomainError>;

    /// All indexed IDs
    async fn ids(&self) -> Result<Vec<EntryId>, DomainError>;

    /// Number of indexed vectors
    async fn len(&self) -> Result<usize, DomainError>;

    async fn is_empty(&self) -> Result<bool, DomainError> {
        Ok(self.len().await? == 0)
    }

    /// Vector length accepted by this index
    fn dimensions(&self) -> usize;

    /// Drop every vector
    async fn clear(&self) -> Result<(), DomainError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> EntryId {
        EntryId::new(s).unwrap()
    }

    #[test]
    fn test_ranking_order() {
        let mut hits = vec![
            ScoredId::new(id("b"), 0.5),
            ScoredId::new(id("c"), 0.9),
            ScoredId::new(id("a"), 0.5),
        ];

        hits.sort_by(ScoredId::ranking_order);

        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
