//! Similarity retrieval over the knowledge base

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::embedding::Embedder;
use crate::domain::knowledge::KnowledgeStore;
use crate::domain::retrieval::RetrievalResult;
use crate::domain::vector_index::VectorIndex;
use crate::domain::DomainError;
use crate::infrastructure::observability::record_orphan_skipped;

/// Embeds a query, searches the index and resolves hits to entries
#[derive(Debug)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    store: Arc<dyn KnowledgeStore>,
    min_score: Option<f32>,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        store: Arc<dyn KnowledgeStore>,
    ) -> Self {
        Self {
            embedder,
            index,
            store,
            min_score: None,
        }
    }

    /// Drop hits scoring below `min_score`; `None` keeps every hit
    pub fn with_min_score(mut self, min_score: Option<f32>) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn min_score(&self) -> Option<f32> {
        self.min_score
    }

    /// Up to `k` entries most similar to `query`, best first. Safe to retry.
    ///
    /// A hit whose entry no longer exists is skipped rather than failing the
    /// whole retrieval; ranks are assigned after skipping.
    pub async fn retrieve(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<RetrievalResult>, DomainError> {
        if query.trim().is_empty() {
            return Err(DomainError::invalid_argument("Query cannot be empty"));
        }
        if k == 0 {
            return Err(DomainError::invalid_argument("k must be greater than 0"));
        }

        let embedding = self.embedder.embed(query).await?;
        let hits = self.index.search(&embedding, k).await?;
        let total_hits = hits.len();

        let mut results = Vec::with_capacity(hits.len());

        for hit in hits {
            if let Some(min_score) = self.min_score {
                if hit.score < min_score {
                    continue;
                }
            }

            let entry = match self.store.get(&hit.id).await {
                Ok(entry) => entry,
                Err(DomainError::NotFound { .. }) => {
                    warn!(
                        entry_id = %hit.id,
                        inconsistency = true,
                        "Indexed id has no stored entry, skipping"
                    );
                    record_orphan_skipped();
                    continue;
                }
                Err(e) => return Err(e),
            };

            results.push(RetrievalResult {
                entry_id: hit.id,
                text: entry.text().to_string(),
                score: hit.score,
                rank: results.len() + 1,
                metadata: entry.metadata().clone(),
            });
        }

        debug!(
            hits = total_hits,
            returned = results.len(),
            k,
            "Retrieval finished"
        );

        Ok(results)
    }
}
