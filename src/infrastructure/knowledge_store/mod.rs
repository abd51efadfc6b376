//! Knowledge store implementations

mod factory;
mod in_memory;
mod postgres;

pub use factory::{KnowledgeStoreFactory, StorageConfig, StorageType};
pub use in_memory::InMemoryKnowledgeStore;
pub use postgres::{PostgresConfig, PostgresKnowledgeStore};
