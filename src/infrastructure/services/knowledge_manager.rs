//! Knowledge manager - keeps the entry store and the vector index in step

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::domain::embedding::Embedder;
use crate::domain::ingestion::{ChunkingConfig, ChunkingStrategy};
use crate::domain::knowledge::validation::validate_entry_text;
use crate::domain::knowledge::{
    EntryId, KnowledgeEntry, KnowledgeStore, Metadata, NewKnowledgeEntry,
};
use crate::domain::vector_index::VectorIndex;
use crate::domain::DomainError;
use crate::infrastructure::ingestion::ParagraphChunker;
use crate::infrastructure::observability::{record_entries_added, record_entry_deleted};

/// Orphans removed by a reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub orphan_vectors_removed: usize,
    pub orphan_entries_removed: usize,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.orphan_vectors_removed == 0 && self.orphan_entries_removed == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeStats {
    pub entries: usize,
    pub vectors: usize,
    pub dimensions: usize,
    pub embedder: &'static str,
    pub storage: &'static str,
}

/// Owns every mutation of the knowledge base.
///
/// Writes are serialised by one async lock. Embedding always happens before
/// the lock is taken, so a slow embedder never blocks other writers for
/// longer than its own call.
#[derive(Debug)]
pub struct KnowledgeManager {
    store: Arc<dyn KnowledgeStore>,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    chunker: Arc<dyn ChunkingStrategy>,
    chunking: ChunkingConfig,
    write_lock: Mutex<()>,
}

impl KnowledgeManager {
    pub fn new(
        store: Arc<dyn KnowledgeStore>,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, DomainError> {
        if index.dimensions() != embedder.dimensions() {
            return Err(DomainError::configuration(format!(
                "Embedder '{}' produces {} dimensions but the index expects {}",
                embedder.name(),
                embedder.dimensions(),
                index.dimensions()
            )));
        }

        let manager = Self {
            store,
            index,
            embedder,
            chunker: Arc::new(ParagraphChunker::new()),
            chunking: ChunkingConfig::default(),
            write_lock: Mutex::new(()),
        };
        manager.check_chunking(&manager.chunking)?;

        Ok(manager)
    }

    /// Replace the chunking strategy and its limits
    pub fn with_chunking(
        mut self,
        chunker: Arc<dyn ChunkingStrategy>,
        config: ChunkingConfig,
    ) -> Result<Self, DomainError> {
        self.check_chunking(&config)?;
        self.chunker = chunker;
        self.chunking = config;
        Ok(self)
    }

    fn check_chunking(&self, config: &ChunkingConfig) -> Result<(), DomainError> {
        config
            .validate()
            .map_err(|e| DomainError::configuration(e.to_string()))?;

        if config.max_size > self.embedder.max_input_chars() {
            return Err(DomainError::configuration(format!(
                "chunking.max_size ({}) exceeds the {} embedder input limit ({})",
                config.max_size,
                self.embedder.name(),
                self.embedder.max_input_chars()
            )));
        }

        Ok(())
    }

    pub fn store(&self) -> &Arc<dyn KnowledgeStore> {
        &self.store
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Store a text and index it. Not safe to retry blindly: a retry after
    /// an ambiguous failure may store the text twice.
    pub async fn add(&self, text: &str, metadata: Metadata) -> Result<EntryId, DomainError> {
        self.add_entry(NewKnowledgeEntry::new(text).with_metadata(metadata))
            .await
    }

    /// Like [`add`](Self::add) but honours a caller-supplied id
    pub async fn add_entry(&self, entry: NewKnowledgeEntry) -> Result<EntryId, DomainError> {
        validate_entry_text(&entry.text).map_err(|e| DomainError::invalid_entry(e.to_string()))?;

        let embedding = self.embedder.embed(&entry.text).await?;

        let _guard = self.write_lock.lock().await;
        let id = self.insert_locked(entry, embedding).await?;
        record_entries_added(1);

        info!(entry_id = %id, "Knowledge entry added");
        Ok(id)
    }

    async fn insert_locked(
        &self,
        entry: NewKnowledgeEntry,
        embedding: Vec<f32>,
    ) -> Result<EntryId, DomainError> {
        let id = self.store.put(entry).await?;

        if let Err(e) = self.index.upsert(id.clone(), embedding).await {
            warn!(entry_id = %id, error = %e, "Vector write failed, rolling back entry");

            if let Err(rollback) = self.store.delete(&id).await {
                error!(
                    entry_id = %id,
                    error = %rollback,
                    inconsistency = true,
                    "Rollback failed, entry stored without a vector"
                );
            }

            return Err(e);
        }

        Ok(id)
    }

    /// Remove an entry and its vector; `false` when it did not exist
    pub async fn delete(&self, id: &EntryId) -> Result<bool, DomainError> {
        let _guard = self.write_lock.lock().await;

        let vector_removed = self.index.remove(id).await?;

        let existed = match self.store.delete(id).await {
            Ok(existed) => existed,
            Err(e) => {
                error!(
                    entry_id = %id,
                    vector_removed,
                    error = %e,
                    inconsistency = true,
                    "Entry delete failed after its vector was removed"
                );
                return Err(e);
            }
        };

        if existed {
            record_entry_deleted();
            info!(entry_id = %id, "Knowledge entry deleted");
        } else if vector_removed {
            warn!(entry_id = %id, inconsistency = true, "Removed a vector with no entry");
        }

        Ok(existed)
    }

    pub async fn get(&self, id: &EntryId) -> Result<KnowledgeEntry, DomainError> {
        self.store.get(id).await
    }

    /// All entries, oldest first
    pub async fn list(&self) -> Result<Vec<KnowledgeEntry>, DomainError> {
        self.store.list().await
    }

    /// Chunk a document and add every chunk.
    ///
    /// All or nothing: if any chunk fails, the chunks already added by this
    /// call are removed again before the error is returned.
    pub async fn ingest_document(
        &self,
        raw_text: &str,
        metadata: Metadata,
    ) -> Result<Vec<EntryId>, DomainError> {
        let chunks = self.chunker.chunk(raw_text, &self.chunking)?;

        if chunks.is_empty() {
            return Err(DomainError::invalid_argument("Document contains no text"));
        }

        debug!(
            chunks = chunks.len(),
            chunker = self.chunker.name(),
            "Document chunked"
        );

        let mut ids = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            let mut chunk_metadata = metadata.clone();
            chunk.metadata.merge_into(&mut chunk_metadata);

            let entry = NewKnowledgeEntry::new(chunk.content).with_metadata(chunk_metadata);

            match self.add_entry(entry).await {
                Ok(id) => ids.push(id),
                Err(e) => {
                    warn!(added = ids.len(), error = %e, "Ingestion failed, removing added chunks");
                    self.discard(&ids).await;
                    return Err(e);
                }
            }
        }

        info!(chunks = ids.len(), "Document ingested");
        Ok(ids)
    }

    async fn discard(&self, ids: &[EntryId]) {
        for id in ids {
            if let Err(e) = self.delete(id).await {
                error!(entry_id = %id, error = %e, "Failed to remove chunk of a failed ingestion");
            }
        }
    }

    /// Remove vectors without entries and entries without vectors
    pub async fn reconcile(&self) -> Result<ReconcileReport, DomainError> {
        let _guard = self.write_lock.lock().await;

        let entry_ids: HashSet<EntryId> = self.store.ids().await?.into_iter().collect();
        let vector_ids: HashSet<EntryId> = self.index.ids().await?.into_iter().collect();

        let mut report = ReconcileReport::default();

        for id in vector_ids.difference(&entry_ids) {
            warn!(entry_id = %id, inconsistency = true, "Removing orphan vector");
            if self.index.remove(id).await? {
                report.orphan_vectors_removed += 1;
            }
        }

        for id in entry_ids.difference(&vector_ids) {
            warn!(entry_id = %id, inconsistency = true, "Removing entry without a vector");
            if self.store.delete(id).await? {
                report.orphan_entries_removed += 1;
            }
        }

        if report.is_clean() {
            debug!("Reconciliation found no orphans");
        } else {
            info!(
                orphan_vectors_removed = report.orphan_vectors_removed,
                orphan_entries_removed = report.orphan_entries_removed,
                "Reconciliation finished"
            );
        }

        Ok(report)
    }

    /// Re-embed every stored entry and rebuild the index from it.
    ///
    /// Embeds from a snapshot without holding the lock, then applies the
    /// vectors under it. Entries added meanwhile already carry vectors from
    /// [`add`](Self::add); entries deleted meanwhile are skipped.
    pub async fn reindex(&self) -> Result<usize, DomainError> {
        let entries = self.store.list().await?;

        let mut vectors = Vec::with_capacity(entries.len());
        for entry in &entries {
            let embedding = self.embedder.embed(entry.text()).await?;
            vectors.push((entry.id().clone(), embedding));
        }

        let _guard = self.write_lock.lock().await;

        let live: HashSet<EntryId> = self.store.ids().await?.into_iter().collect();
        let mut indexed = 0;

        for (id, embedding) in vectors {
            if live.contains(&id) {
                self.index.upsert(id, embedding).await?;
                indexed += 1;
            }
        }

        for id in self.index.ids().await? {
            if !live.contains(&id) {
                self.index.remove(&id).await?;
            }
        }

        info!(
            indexed,
            embedder = self.embedder.name(),
            "Vector index rebuilt"
        );
        Ok(indexed)
    }

    pub async fn stats(&self) -> Result<KnowledgeStats, DomainError> {
        Ok(KnowledgeStats {
            entries: self.store.count().await?,
            vectors: self.index.len().await?,
            dimensions: self.index.dimensions(),
            embedder: self.embedder.name(),
            storage: self.store.backend_name(),
        })
    }
}
