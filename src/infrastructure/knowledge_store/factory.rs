//! Knowledge store factory for runtime backend selection

use std::sync::Arc;

use serde::Deserialize;

use super::in_memory::InMemoryKnowledgeStore;
use super::postgres::{PostgresConfig, PostgresKnowledgeStore};
use crate::domain::knowledge::KnowledgeStore;
use crate::domain::DomainError;

/// Supported storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    #[default]
    Memory,
    /// PostgreSQL storage
    Postgres,
}

/// `storage` configuration section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    pub postgres: PostgresConfig,
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn postgres(config: PostgresConfig) -> Self {
        Self {
            storage_type: StorageType::Postgres,
            postgres: config,
        }
    }
}

/// Factory for creating knowledge stores
#[derive(Debug)]
pub struct KnowledgeStoreFactory;

impl KnowledgeStoreFactory {
    pub async fn create(config: &StorageConfig) -> Result<Arc<dyn KnowledgeStore>, DomainError> {
        match config.storage_type {
            StorageType::Memory => Ok(Arc::new(InMemoryKnowledgeStore::new())),
            StorageType::Postgres => {
                let store = PostgresKnowledgeStore::connect(&config.postgres).await?;
                Ok(Arc::new(store))
            }
        }
    }
}
