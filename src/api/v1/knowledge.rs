//! Knowledge entry endpoints

use axum::extract::{Path, State};
use tracing::{info, warn};

use crate::api::state::AppState;
use crate::api::types::{
    ApiError, DeleteResponse, Json, KnowledgeListResponse, KnowledgeRequest, KnowledgeResponse,
};
use crate::domain::knowledge::EntryId;
use crate::infrastructure::services::ReconcileReport;

/// POST /api/v1/knowledge
pub async fn add_knowledge(
    State(state): State<AppState>,
    Json(request): Json<KnowledgeRequest>,
) -> Result<Json<KnowledgeResponse>, ApiError> {
    let metadata = request.metadata().map_err(|e| ApiError::from(e).with_param("metadata"))?;

    let id = state.knowledge.add(&request.text, metadata).await?;
    let entry = state.knowledge.get(&id).await?;

    info!(entry_id = %id, "Knowledge added");

    Ok(Json(KnowledgeResponse::from(entry)))
}

/// GET /api/v1/knowledge
pub async fn list_knowledge(
    State(state): State<AppState>,
) -> Result<Json<KnowledgeListResponse>, ApiError> {
    let entries = state.knowledge.list().await?;

    Ok(Json(KnowledgeListResponse::new(entries)))
}

/// DELETE /api/v1/knowledge/{entry_id}
pub async fn delete_knowledge(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = EntryId::new(entry_id.as_str()).map_err(|e| ApiError::from(e).with_param("id"))?;

    if !state.knowledge.delete(&id).await? {
        return Err(ApiError::not_found(format!(
            "Knowledge entry not found: {}",
            entry_id
        )));
    }

    info!(entry_id = %id, "Knowledge deleted");

    Ok(Json(DeleteResponse {
        success: true,
        id: entry_id,
        message: "Knowledge entry deleted successfully".to_string(),
    }))
}

/// POST /api/v1/knowledge/reconcile
pub async fn reconcile_knowledge(
    State(state): State<AppState>,
) -> Result<Json<ReconcileReport>, ApiError> {
    let report = state.knowledge.reconcile().await?;

    if !report.is_clean() {
        warn!(
            orphan_vectors = report.orphan_vectors_removed,
            orphan_entries = report.orphan_entries_removed,
            "Reconciliation repaired the knowledge base"
        );
    }

    Ok(Json(report))
}
