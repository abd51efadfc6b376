//! Document upload

use axum::extract::{Multipart, State};
use tracing::{debug, info};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, UploadResponse};
use crate::domain::knowledge::document_metadata;

/// POST /api/v1/upload
///
/// Takes the first multipart field carrying a file, decodes it as UTF-8 and
/// ingests it as one document. Chunks share the file's metadata.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read multipart field: {}", e)))?
    {
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            debug!(field = ?field.name(), "Skipping non-file multipart field");
            continue;
        };

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| {
                mime_guess::from_path(&filename)
                    .first_or_text_plain()
                    .to_string()
            });

        let bytes = field.bytes().await.map_err(|e| {
            ApiError::bad_request(format!("Failed to read file '{}': {}", filename, e))
        })?;
        let size = bytes.len();

        let text = String::from_utf8(bytes.to_vec()).map_err(|_| {
            ApiError::bad_request("File must be a text file (UTF-8 encoded)").with_param("file")
        })?;

        let metadata = document_metadata(&filename, &content_type, size);
        let ids = state.knowledge.ingest_document(&text, metadata).await?;

        info!(filename = %filename, size, chunks = ids.len(), "Document uploaded");

        return Ok(Json(UploadResponse {
            success: true,
            chunks: ids.len(),
            ids: ids.iter().map(|id| id.to_string()).collect(),
            filename,
            size,
            message: "File processed and added to knowledge base successfully".to_string(),
        }));
    }

    Err(ApiError::bad_request("No file provided").with_param("file"))
}
