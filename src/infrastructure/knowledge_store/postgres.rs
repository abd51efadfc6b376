//! PostgreSQL knowledge store with connection pooling

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use crate::domain::knowledge::validation::validate_entry_text;
use crate::domain::knowledge::{
    EntryId, KnowledgeEntry, KnowledgeStore, Metadata, NewKnowledgeEntry,
};
use crate::domain::DomainError;

static TABLE_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").unwrap());

/// PostgreSQL storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
    /// Table holding knowledge entries
    pub table_name: String,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/jarvis".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
            table_name: "knowledge_entries".to_string(),
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Table names are interpolated into SQL, so only plain identifiers pass
    pub fn validate(&self) -> Result<(), DomainError> {
        if !TABLE_NAME_PATTERN.is_match(&self.table_name) {
            return Err(DomainError::configuration(format!(
                "Invalid table name '{}'",
                self.table_name
            )));
        }

        if self.min_connections > self.max_connections {
            return Err(DomainError::configuration(
                "min_connections must not exceed max_connections",
            ));
        }

        Ok(())
    }
}

/// Knowledge store backed by a single PostgreSQL table
pub struct PostgresKnowledgeStore {
    pool: PgPool,
    table_name: String,
}

impl Debug for PostgresKnowledgeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresKnowledgeStore")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl PostgresKnowledgeStore {
    pub fn new(pool: PgPool, table_name: impl Into<String>) -> Self {
        Self {
            pool,
            table_name: table_name.into(),
        }
    }

    /// Connect with pooling and make sure the table exists
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DomainError> {
        config.validate()?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        let store = Self::new(pool, config.table_name.clone());
        store.ensure_table().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Ensures the entries table exists
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        let query = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                seq BIGSERIAL,
                id VARCHAR(128) PRIMARY KEY,
                text TEXT NOT NULL,
                metadata JSONB NOT NULL DEFAULT '{{}}'::jsonb,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create table: {}", e)))?;

        Ok(())
    }

    fn entry_from_row(row: &PgRow) -> Result<KnowledgeEntry, DomainError> {
        entry_from_parts(
            row.get("id"),
            row.get("text"),
            row.get("metadata"),
            row.get("created_at"),
        )
    }
}

fn entry_from_parts(
    id: String,
    text: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
) -> Result<KnowledgeEntry, DomainError> {
    let id = EntryId::new(id)
        .map_err(|e| DomainError::storage(format!("Invalid stored entry id: {}", e)))?;
    let metadata: Metadata = serde_json::from_value(metadata)
        .map_err(|e| DomainError::storage(format!("Failed to deserialize metadata: {}", e)))?;

    Ok(KnowledgeEntry::new(id, text, metadata).with_created_at(created_at))
}

#[async_trait]
impl KnowledgeStore for PostgresKnowledgeStore {
    async fn put(&self, entry: NewKnowledgeEntry) -> Result<EntryId, DomainError> {
        validate_entry_text(&entry.text).map_err(|e| DomainError::invalid_entry(e.to_string()))?;

        let id = entry.id.unwrap_or_else(EntryId::generate);
        let metadata = serde_json::to_value(&entry.metadata)
            .map_err(|e| DomainError::storage(format!("Failed to serialize metadata: {}", e)))?;

        let query = format!(
            r#"
            INSERT INTO {} (id, text, metadata, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
            self.table_name
        );

        let result = sqlx::query(&query)
            .bind(id.as_str())
            .bind(&entry.text)
            .bind(&metadata)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to insert entry: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::conflict(format!(
                "Knowledge entry '{}' already exists",
                id
            )));
        }

        Ok(id)
    }

    async fn get(&self, id: &EntryId) -> Result<KnowledgeEntry, DomainError> {
        let query = format!(
            "SELECT id, text, metadata, created_at FROM {} WHERE id = $1",
            self.table_name
        );

        let row = sqlx::query(&query)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get entry: {}", e)))?;

        match row {
            Some(row) => Self::entry_from_row(&row),
            None => Err(DomainError::not_found(format!(
                "Knowledge entry '{}' not found",
                id
            ))),
        }
    }

    async fn delete(&self, id: &EntryId) -> Result<bool, DomainError> {
        let query = format!("DELETE FROM {} WHERE id = $1", self.table_name);

        let result = sqlx::query(&query)
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete entry: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<KnowledgeEntry>, DomainError> {
        let query = format!(
            "SELECT id, text, metadata, created_at FROM {} ORDER BY created_at, seq",
            self.table_name
        );

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list entries: {}", e)))?;

        rows.iter().map(Self::entry_from_row).collect()
    }

    async fn ids(&self) -> Result<Vec<EntryId>, DomainError> {
        let query = format!("SELECT id FROM {}", self.table_name);

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list entry ids: {}", e)))?;

        rows.iter()
            .map(|row| {
                EntryId::new(row.get::<String, _>("id"))
                    .map_err(|e| DomainError::storage(format!("Invalid stored entry id: {}", e)))
            })
            .collect()
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let query = format!("SELECT COUNT(*) AS count FROM {}", self.table_name);

        let row = sqlx::query(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count entries: {}", e)))?;

        let count: i64 = row.get("count");
        Ok(count as usize)
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge::MetadataValue;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PostgresConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_rejects_unsafe_table_name() {
        let config = PostgresConfig::default().with_table_name("entries; DROP TABLE x");

        assert!(matches!(
            config.validate(),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: PostgresConfig =
            serde_json::from_value(serde_json::json!({ "url": "postgres://db/notes" })).unwrap();

        assert_eq!(config.url, "postgres://db/notes");
        assert_eq!(config.table_name, "knowledge_entries");
        assert_eq!(config.max_connections, 10);
    }

    #[test]
    fn test_entry_from_parts() {
        let created_at = Utc::now();
        let entry = entry_from_parts(
            "abc".to_string(),
            "The sky is blue".to_string(),
            serde_json::json!({ "source": "notes", "page": 2 }),
            created_at,
        )
        .unwrap();

        assert_eq!(entry.id().as_str(), "abc");
        assert_eq!(entry.text(), "The sky is blue");
        assert_eq!(entry.metadata()["page"], MetadataValue::Integer(2));
        assert_eq!(entry.created_at(), created_at);
    }

    #[test]
    fn test_entry_from_parts_rejects_nested_metadata() {
        let result = entry_from_parts(
            "abc".to_string(),
            "text".to_string(),
            serde_json::json!({ "tags": ["a"] }),
            Utc::now(),
        );

        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }
}
