//! In-memory knowledge store

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::knowledge::validation::validate_entry_text;
use crate::domain::knowledge::{EntryId, KnowledgeEntry, KnowledgeStore, NewKnowledgeEntry};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Entries {
    by_id: HashMap<EntryId, (u64, KnowledgeEntry)>,
    next_seq: u64,
}

/// Thread-safe in-memory knowledge store
///
/// Useful for testing and development. Data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryKnowledgeStore {
    entries: RwLock<Entries>,
}

impl InMemoryKnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn put(&self, entry: NewKnowledgeEntry) -> Result<EntryId, DomainError> {
        validate_entry_text(&entry.text).map_err(|e| DomainError::invalid_entry(e.to_string()))?;

        let id = entry.id.unwrap_or_else(EntryId::generate);
        let mut entries = self.entries.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        if entries.by_id.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "Knowledge entry '{}' already exists",
                id
            )));
        }

        let seq = entries.next_seq;
        entries.next_seq += 1;
        entries.by_id.insert(
            id.clone(),
            (seq, KnowledgeEntry::new(id.clone(), entry.text, entry.metadata)),
        );

        Ok(id)
    }

    async fn get(&self, id: &EntryId) -> Result<KnowledgeEntry, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        entries
            .by_id
            .get(id)
            .map(|(_, entry)| entry.clone())
            .ok_or_else(|| DomainError::not_found(format!("Knowledge entry '{}' not found", id)))
    }

    async fn delete(&self, id: &EntryId) -> Result<bool, DomainError> {
        let mut entries = self.entries.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(entries.by_id.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<KnowledgeEntry>, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut rows: Vec<&(u64, KnowledgeEntry)> = entries.by_id.values().collect();
        rows.sort_by(|(seq_a, a), (seq_b, b)| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| seq_a.cmp(seq_b))
        });

        Ok(rows.into_iter().map(|(_, entry)| entry.clone()).collect())
    }

    async fn ids(&self) -> Result<Vec<EntryId>, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entries.by_id.keys().cloned().collect())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entries.by_id.len())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
