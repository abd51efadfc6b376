//! In-memory vector index using exact linear search

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::embedding::{dot, l2_normalize};
use crate::domain::knowledge::EntryId;
use crate::domain::vector_index::{ScoredId, VectorIndex};
use crate::domain::DomainError;

/// Brute-force cosine index over unit-normalised vectors
///
/// Exact results, linear in the number of entries. Suitable for personal-scale
/// knowledge bases of a few thousand snippets.
#[derive(Debug)]
pub struct InMemoryVectorIndex {
    dimensions: usize,
    vectors: RwLock<HashMap<EntryId, Vec<f32>>>,
}

impl InMemoryVectorIndex {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: RwLock::new(HashMap::new()),
        }
    }

    fn check_dimensions(&self, len: usize, what: &str) -> Result<(), DomainError> {
        if len != self.dimensions {
            return Err(DomainError::invalid_argument(format!(
                "{} has {} dimensions, index expects {}",
                what, len, self.dimensions
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, id: EntryId, mut embedding: Vec<f32>) -> Result<(), DomainError> {
        self.check_dimensions(embedding.len(), "Embedding")?;
        l2_normalize(&mut embedding);

        let mut vectors = self.vectors.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        vectors.insert(id, embedding);
        Ok(())
    }

    async fn remove(&self, id: &EntryId) -> Result<bool, DomainError> {
        let mut vectors = self.vectors.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(vectors.remove(id).is_some())
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredId>, DomainError> {
        if k == 0 {
            return Err(DomainError::invalid_argument("k must be greater than 0"));
        }
        self.check_dimensions(query.len(), "Query")?;

        let mut query = query.to_vec();
        l2_normalize(&mut query);

        let vectors = self.vectors.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut results: Vec<ScoredId> = vectors
            .iter()
            .map(|(id, vector)| ScoredId::new(id.clone(), dot(&query, vector).clamp(-1.0, 1.0)))
            .collect();
        drop(vectors);

        results.sort_by(ScoredId::ranking_order);
        results.truncate(k);

        Ok(results)
    }

    async fn ids(&self) -> Result<Vec<EntryId>, DomainError> {
        let vectors = self.vectors.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(vectors.keys().cloned().collect())
    }

    async fn len(&self) -> Result<usize, DomainError> {
        let vectors = self.vectors.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(vectors.len())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let mut vectors = self.vectors.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        vectors.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> EntryId {
        EntryId::new(s).unwrap()
    }

    async fn index_with(vectors: &[(&str, Vec<f32>)]) -> InMemoryVectorIndex {
        let index = InMemoryVectorIndex::new(3);
        for (name, vector) in vectors {
            index.upsert(id(name), vector.clone()).await.unwrap();
        }
        index
    }

    #[tokio::test]
    async fn test_search_empty_index() {
        let index = InMemoryVectorIndex::new(3);

        let results = index.search(&[1.0, 0.0, 0.0], 5).await.unwrap();

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_rejects_zero_k() {
        let index = index_with(&[("a", vec![1.0, 0.0, 0.0])]).await;

        let result = index.search(&[1.0, 0.0, 0.0], 0).await;

        assert!(matches!(result, Err(DomainError::InvalidArgument { .. })));
    }

    #[tokio::test]
    async fn test_search_rejects_wrong_query_length() {
        let index = index_with(&[("a", vec![1.0, 0.0, 0.0])]).await;

        let result = index.search(&[1.0, 0.0], 1).await;

        assert!(matches!(result, Err(DomainError::InvalidArgument { .. })));
    }

    #[tokio::test]
    async fn test_upsert_rejects_wrong_length() {
        let index = InMemoryVectorIndex::new(3);

        let result = index.upsert(id("a"), vec![1.0; 4]).await;

        assert!(matches!(result, Err(DomainError::InvalidArgument { .. })));
        assert_eq!(index.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_orders_by_descending_score_and_bounds_length() {
        let index = index_with(&[
            ("a", vec![1.0, 0.0, 0.0]),
            ("b", vec![0.7, 0.7, 0.0]),
            ("c", vec![0.0, 1.0, 0.0]),
            ("d", vec![-1.0, 0.0, 0.0]),
        ])
        .await;

        let results = index.search(&[1.0, 0.1, 0.0], 3).await.unwrap();

        assert_eq!(results.len(), 3);
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        for pair in results.windows(2) {
            assert!(pair[0].score > pair[1].score);
        }

        let all = index.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(all.len(), 4);
        assert!((all[3].score + 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_self_match_has_maximum_score() {
        let index = index_with(&[
            ("a", vec![0.2, 0.9, 0.1]),
            ("b", vec![0.9, 0.1, 0.3]),
            ("c", vec![0.4, 0.4, 0.8]),
        ])
        .await;

        let results = index.search(&[0.9, 0.1, 0.3], 3).await.unwrap();

        assert_eq!(results[0].id.as_str(), "b");
        assert!((results[0].score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_ties_break_on_lower_id() {
        let index = index_with(&[
            ("zeta", vec![1.0, 0.0, 0.0]),
            ("alpha", vec![2.0, 0.0, 0.0]),
            ("mid", vec![1.0, 0.0, 0.0]),
        ])
        .await;

        let results = index.search(&[1.0, 0.0, 0.0], 2).await.unwrap();

        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "mid"]);
    }

    #[tokio::test]
    async fn test_upsert_replaces_vector() {
        let index = index_with(&[("a", vec![1.0, 0.0, 0.0])]).await;

        index.upsert(id("a"), vec![0.0, 1.0, 0.0]).await.unwrap();
        let results = index.search(&[0.0, 1.0, 0.0], 1).await.unwrap();

        assert_eq!(index.len().await.unwrap(), 1);
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_remove_then_search_never_returns_id() {
        let index = index_with(&[("a", vec![1.0, 0.0, 0.0]), ("b", vec![0.0, 1.0, 0.0])]).await;

        assert!(index.remove(&id("a")).await.unwrap());
        assert!(!index.remove(&id("a")).await.unwrap());

        let results = index.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert!(results.iter().all(|r| r.id.as_str() != "a"));
    }

    #[tokio::test]
    async fn test_zero_query_scores_zero() {
        let index = index_with(&[("a", vec![1.0, 0.0, 0.0])]).await;

        let results = index.search(&[0.0, 0.0, 0.0], 1).await.unwrap();

        assert_eq!(results[0].score, 0.0);
    }

    #[tokio::test]
    async fn test_clear() {
        let index = index_with(&[("a", vec![1.0, 0.0, 0.0])]).await;

        index.clear().await.unwrap();

        assert!(index.is_empty().await.unwrap());
        assert!(index.ids().await.unwrap().is_empty());
    }
}
