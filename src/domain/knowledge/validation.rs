//! Knowledge entry validation utilities

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length for entry IDs
pub const MAX_ENTRY_ID_LENGTH: usize = 128;

/// Maximum length for metadata keys
pub const MAX_METADATA_KEY_LENGTH: usize = 64;

/// Entry IDs are opaque but must be URL-path safe
static ENTRY_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._:-]*$").unwrap());

/// Knowledge entry validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum KnowledgeValidationError {
    /// ID is empty
    EmptyId,
    /// ID exceeds maximum length
    IdTooLong { length: usize, max: usize },
    /// ID contains characters that are not URL-path safe
    InvalidIdFormat { id: String },
    /// Text is empty or whitespace only
    EmptyText,
    /// Metadata key is empty or too long
    InvalidMetadataKey { key: String },
}

impl fmt::Display for KnowledgeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "Entry ID cannot be empty"),
            Self::IdTooLong { length, max } => {
                write!(f, "Entry ID too long: {} characters (max {})", length, max)
            }
            Self::InvalidIdFormat { id } => {
                write!(
                    f,
                    "Invalid entry ID format '{}': must be alphanumeric with '.', '_', ':' or '-'",
                    id
                )
            }
            Self::EmptyText => write!(f, "Knowledge text cannot be empty"),
            Self::InvalidMetadataKey { key } => write!(
                f,
                "Invalid metadata key '{}': must be 1-{} characters",
                key, MAX_METADATA_KEY_LENGTH
            ),
        }
    }
}

impl std::error::Error for KnowledgeValidationError {}

/// Validate an entry ID
pub fn validate_entry_id(id: &str) -> Result<(), KnowledgeValidationError> {
    if id.is_empty() {
        return Err(KnowledgeValidationError::EmptyId);
    }

    if id.len() > MAX_ENTRY_ID_LENGTH {
        return Err(KnowledgeValidationError::IdTooLong {
            length: id.len(),
            max: MAX_ENTRY_ID_LENGTH,
        });
    }

    if !ENTRY_ID_PATTERN.is_match(id) {
        return Err(KnowledgeValidationError::InvalidIdFormat { id: id.to_string() });
    }

    Ok(())
}

/// Validate knowledge text (must contain something other than whitespace)
pub fn validate_entry_text(text: &str) -> Result<(), KnowledgeValidationError> {
    if text.trim().is_empty() {
        return Err(KnowledgeValidationError::EmptyText);
    }

    Ok(())
}

/// Validate a metadata key
pub fn validate_metadata_key(key: &str) -> Result<(), KnowledgeValidationError> {
    if key.is_empty() || key.len() > MAX_METADATA_KEY_LENGTH {
        return Err(KnowledgeValidationError::InvalidMetadataKey {
            key: key.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_entry_ids() {
        assert!(validate_entry_id("a").is_ok());
        assert!(validate_entry_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_entry_id("notes.2024:part_1").is_ok());
    }

    #[test]
    fn test_invalid_entry_ids() {
        assert_eq!(validate_entry_id(""), Err(KnowledgeValidationError::EmptyId));
        assert!(matches!(
            validate_entry_id("has space"),
            Err(KnowledgeValidationError::InvalidIdFormat { .. })
        ));
        assert!(matches!(
            validate_entry_id("a/b"),
            Err(KnowledgeValidationError::InvalidIdFormat { .. })
        ));
        assert!(matches!(
            validate_entry_id("-leading"),
            Err(KnowledgeValidationError::InvalidIdFormat { .. })
        ));

        let long_id = "a".repeat(MAX_ENTRY_ID_LENGTH + 1);
        assert!(matches!(
            validate_entry_id(&long_id),
            Err(KnowledgeValidationError::IdTooLong { .. })
        ));
    }

    #[test]
    fn test_entry_text() {
        assert!(validate_entry_text("The sky is blue").is_ok());
        assert_eq!(validate_entry_text(""), Err(KnowledgeValidationError::EmptyText));
        assert_eq!(
            validate_entry_text(" \n\t "),
            Err(KnowledgeValidationError::EmptyText)
        );
    }

    #[test]
    fn test_metadata_key() {
        assert!(validate_metadata_key("filename").is_ok());
        assert!(validate_metadata_key("").is_err());
        assert!(validate_metadata_key(&"k".repeat(65)).is_err());
    }
}
