//! Ingest command - adds a text file to the knowledge base

use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::domain::knowledge::{document_metadata, EntryId};
use crate::infrastructure::services::KnowledgeManager;

pub async fn run(file: &Path) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let state = crate::create_app_state(&config).await?;

    let result = ingest_file(&state.knowledge, file).await;
    state.knowledge.store().close().await;
    let ids = result?;

    info!(file = %file.display(), chunks = ids.len(), "File ingested");

    println!("Added {} chunk(s) from {}", ids.len(), file.display());
    for id in &ids {
        println!("  {}", id);
    }

    Ok(())
}

/// Read a UTF-8 file and ingest it with file metadata
pub async fn ingest_file(
    manager: &KnowledgeManager,
    path: &Path,
) -> anyhow::Result<Vec<EntryId>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {} as UTF-8 text", path.display()))?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let content_type = mime_guess::from_path(path).first_or_text_plain().to_string();
    let metadata = document_metadata(&filename, &content_type, text.len());

    let ids = manager
        .ingest_document(&text, metadata)
        .await
        .with_context(|| format!("Failed to ingest {}", path.display()))?;

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::domain::knowledge::MetadataValue;

    #[tokio::test]
    async fn test_ingest_file_records_metadata() {
        let dir = std::env::temp_dir().join(format!("jarvis-ingest-{}", EntryId::generate()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("notes.txt");
        tokio::fs::write(&path, "The sky is blue.\n\nGrass is green.")
            .await
            .unwrap();

        let state = crate::create_app_state(&AppConfig::default()).await.unwrap();
        let ids = ingest_file(&state.knowledge, &path).await.unwrap();

        assert!(!ids.is_empty());
        let entry = state.knowledge.get(&ids[0]).await.unwrap();
        assert_eq!(entry.metadata()["filename"], MetadataValue::from("notes.txt"));
        assert_eq!(entry.metadata()["content_type"], MetadataValue::from("text/plain"));

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let state = crate::create_app_state(&AppConfig::default()).await.unwrap();

        let result = ingest_file(&state.knowledge, Path::new("/definitely/not/here.txt")).await;

        assert!(result.is_err());
    }
}
