//! Retrieval and answer value types

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::knowledge::{EntryId, Metadata};

/// A knowledge entry matched by a query, with its position in the ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalResult {
    pub entry_id: EntryId,
    pub text: String,
    /// Cosine similarity in [-1, 1]
    pub score: f32,
    /// 1-based position in the result list
    pub rank: usize,
    pub metadata: Metadata,
}

/// Final answer returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub response: String,
    /// Snippet texts that were actually placed in the prompt
    pub sources: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl Answer {
    pub fn new(response: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            response: response.into(),
            sources,
            timestamp: Utc::now(),
        }
    }
}
