//! Chat endpoint

use axum::extract::State;
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, ChatRequest, ChatResponse, Json};

/// POST /api/v1/chat
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::bad_request("Message cannot be empty").with_param("message"));
    }

    let history = request.history();

    info!(
        message_chars = request.message.chars().count(),
        history_turns = history.len(),
        "Processing chat request"
    );

    let answer = state
        .answers
        .ask_with_timeout(&request.message, &history, state.ask_timeout)
        .await?;

    info!(sources = answer.sources.len(), "Chat answered");

    Ok(Json(ChatResponse::from(answer)))
}
