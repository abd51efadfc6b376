//! Knowledge base statistics

use axum::extract::State;
use chrono::Utc;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, StatsResponse};

/// GET /api/v1/stats
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.knowledge.stats().await?;

    Ok(Json(StatsResponse {
        vector_store: stats,
        llm_model: state.models.generation_model.clone(),
        generation_backend: state.answers.backend_name(),
        embedding_model: state.models.embedding_model.clone(),
        timestamp: Utc::now(),
    }))
}
