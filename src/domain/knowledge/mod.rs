//! Knowledge entry domain models and the store trait

mod entry;
mod store;
pub mod validation;

pub use entry::{
    document_metadata, metadata_from_json, EntryId, KnowledgeEntry, Metadata, MetadataValue,
    NewKnowledgeEntry,
};
pub use store::KnowledgeStore;
pub use validation::KnowledgeValidationError;

#[cfg(test)]
pub use store::mock::MockKnowledgeStore;
