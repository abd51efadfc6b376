//! Knowledge management bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::knowledge::{metadata_from_json, KnowledgeEntry, Metadata};
use crate::domain::DomainError;
use crate::infrastructure::services::KnowledgeStats;

/// `POST /api/v1/knowledge`
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeRequest {
    pub text: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl KnowledgeRequest {
    pub fn metadata(&self) -> Result<Metadata, DomainError> {
        match &self.metadata {
            Some(map) => metadata_from_json(map.clone()),
            None => Ok(Metadata::new()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeResponse {
    pub id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
}

impl From<KnowledgeEntry> for KnowledgeResponse {
    fn from(entry: KnowledgeEntry) -> Self {
        Self {
            id: entry.id().to_string(),
            text: entry.text().to_string(),
            timestamp: entry.created_at(),
            success: true,
        }
    }
}

/// An entry as listed to clients; vectors never leave the server
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeItem {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

impl From<KnowledgeEntry> for KnowledgeItem {
    fn from(entry: KnowledgeEntry) -> Self {
        Self {
            id: entry.id().to_string(),
            text: entry.text().to_string(),
            metadata: entry.metadata().clone(),
            created_at: entry.created_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeListResponse {
    pub knowledge: Vec<KnowledgeItem>,
    pub count: usize,
}

impl KnowledgeListResponse {
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        let knowledge: Vec<KnowledgeItem> = entries.into_iter().map(KnowledgeItem::from).collect();

        Self {
            count: knowledge.len(),
            knowledge,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub id: String,
    pub message: String,
}

/// `POST /api/v1/upload`
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub ids: Vec<String>,
    pub chunks: usize,
    pub filename: String,
    pub size: usize,
    pub message: String,
}

/// `GET /api/v1/stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub vector_store: KnowledgeStats,
    pub llm_model: String,
    pub generation_backend: &'static str,
    pub embedding_model: String,
    pub timestamp: DateTime<Utc>,
}
