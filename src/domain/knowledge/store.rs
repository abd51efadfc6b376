//! Knowledge store trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::{EntryId, KnowledgeEntry, NewKnowledgeEntry};
use crate::domain::DomainError;

/// Durable home of knowledge entries.
///
/// Entries are immutable once stored. The store performs no deduplication:
/// two `put` calls with identical text create two entries.
#[async_trait]
pub trait KnowledgeStore: Send + Sync + Debug {
    /// Store a new entry, generating an ID when the caller supplies none.
    ///
    /// Fails with `InvalidEntry` for empty text and `Conflict` when the
    /// supplied ID is already taken. Not safe to retry blindly.
    async fn put(&self, entry: NewKnowledgeEntry) -> Result<EntryId, DomainError>;

    /// Get an entry by ID, `NotFound` if absent
    async fn get(&self, id: &EntryId) -> Result<KnowledgeEntry, DomainError>;

    /// Delete an entry, returning whether it existed
    async fn delete(&self, id: &EntryId) -> Result<bool, DomainError>;

    /// All entries, oldest first, ties in insertion order
    async fn list(&self) -> Result<Vec<KnowledgeEntry>, DomainError>;

    /// IDs of all stored entries
    async fn ids(&self) -> Result<Vec<EntryId>, DomainError>;

    /// Number of stored entries
    async fn count(&self) -> Result<usize, DomainError>;

    /// Whether entries survive a restart
    fn is_durable(&self) -> bool {
        false
    }

    /// Backend name for stats and logs
    fn backend_name(&self) -> &'static str;

    /// Release any held resources
    async fn close(&self) {}
}
