//! Knowledge entry entity

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{validate_entry_id, validate_metadata_key};
use crate::domain::DomainError;

/// Opaque identifier shared by the knowledge store and the vector index
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Create an ID from caller-supplied text
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        validate_entry_id(&id).map_err(|e| DomainError::invalid_argument(e.to_string()))?;
        Ok(Self(id))
    }

    /// Generate a fresh random ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Scalar metadata value attached to an entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<usize> for MetadataValue {
    fn from(value: usize) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl TryFrom<serde_json::Value> for MetadataValue {
    type Error = DomainError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Null => Ok(Self::Null),
            serde_json::Value::Bool(b) => Ok(Self::Bool(b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Integer(i)),
                None => n.as_f64().map(Self::Float).ok_or_else(|| {
                    DomainError::invalid_argument(format!("Unsupported metadata number: {}", n))
                }),
            },
            serde_json::Value::String(s) => Ok(Self::String(s)),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(
                DomainError::invalid_argument("Metadata values must be scalars"),
            ),
        }
    }
}

/// Map of string keys to scalar values
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Convert a JSON object into entry metadata, rejecting nested values
pub fn metadata_from_json(
    map: serde_json::Map<String, serde_json::Value>,
) -> Result<Metadata, DomainError> {
    let mut metadata = Metadata::new();

    for (key, value) in map {
        validate_metadata_key(&key).map_err(|e| DomainError::invalid_argument(e.to_string()))?;
        let value = MetadataValue::try_from(value).map_err(|_| {
            DomainError::invalid_argument(format!("Metadata value for '{}' must be a scalar", key))
        })?;
        metadata.insert(key, value);
    }

    Ok(metadata)
}

/// Metadata attached to every chunk of an uploaded or ingested file
pub fn document_metadata(filename: &str, content_type: &str, size: usize) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("filename".to_string(), filename.into());
    metadata.insert("content_type".to_string(), content_type.into());
    metadata.insert("size".to_string(), size.into());
    metadata
}

/// A stored knowledge snippet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    id: EntryId,
    text: String,
    metadata: Metadata,
    created_at: DateTime<Utc>,
}

impl KnowledgeEntry {
    pub fn new(id: EntryId, text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            id,
            text: text.into(),
            metadata,
            created_at: Utc::now(),
        }
    }

    /// Set the creation time (for loading from storage)
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn id(&self) -> &EntryId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Input for `KnowledgeStore::put`
#[derive(Debug, Clone, Default)]
pub struct NewKnowledgeEntry {
    pub id: Option<EntryId>,
    pub text: String,
    pub metadata: Metadata,
}

impl NewKnowledgeEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_id(mut self, id: EntryId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = EntryId::generate();
        let b = EntryId::generate();

        assert_ne!(a, b);
        assert!(EntryId::new(a.as_str()).is_ok());
    }

    #[test]
    fn test_entry_id_rejects_bad_format() {
        assert!(matches!(
            EntryId::new("not valid"),
            Err(DomainError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_entry_id_ordering_is_lexicographic() {
        let a = EntryId::new("a-2").unwrap();
        let b = EntryId::new("b-1").unwrap();

        assert!(a < b);
    }

    #[test]
    fn test_metadata_from_json_scalars() {
        let json = serde_json::json!({
            "source": "notes.txt",
            "page": 3,
            "weight": 0.5,
            "pinned": true,
            "note": null
        });
        let serde_json::Value::Object(map) = json else {
            unreachable!()
        };

        let metadata = metadata_from_json(map).unwrap();

        assert_eq!(metadata["source"], MetadataValue::from("notes.txt"));
        assert_eq!(metadata["page"], MetadataValue::Integer(3));
        assert_eq!(metadata["weight"], MetadataValue::Float(0.5));
        assert_eq!(metadata["pinned"], MetadataValue::Bool(true));
        assert_eq!(metadata["note"], MetadataValue::Null);
    }

    #[test]
    fn test_metadata_from_json_rejects_nested() {
        let json = serde_json::json!({ "tags": ["a", "b"] });
        let serde_json::Value::Object(map) = json else {
            unreachable!()
        };

        let result = metadata_from_json(map);

        assert!(matches!(result, Err(DomainError::InvalidArgument { .. })));
    }

    #[test]
    fn test_metadata_serializes_as_plain_json() {
        let entry = NewKnowledgeEntry::new("text")
            .with_meta("source", "upload")
            .with_meta("chunk_index", 0usize);

        let json = serde_json::to_value(&entry.metadata).unwrap();

        assert_eq!(json, serde_json::json!({ "chunk_index": 0, "source": "upload" }));
    }

    #[test]
    fn test_metadata_deserializes_scalars() {
        let metadata: Metadata =
            serde_json::from_str(r#"{"a": 1, "b": "x", "c": 1.5, "d": false}"#).unwrap();

        assert_eq!(metadata["a"], MetadataValue::Integer(1));
        assert_eq!(metadata["b"], MetadataValue::from("x"));
        assert_eq!(metadata["c"], MetadataValue::Float(1.5));
        assert_eq!(metadata["d"], MetadataValue::Bool(false));
    }
}
