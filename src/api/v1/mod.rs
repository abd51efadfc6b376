//! `/api/v1` endpoints

pub mod chat;
pub mod knowledge;
pub mod stats;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use super::state::AppState;

pub fn create_v1_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::chat))
        .route(
            "/knowledge",
            post(knowledge::add_knowledge).get(knowledge::list_knowledge),
        )
        .route("/knowledge/reconcile", post(knowledge::reconcile_knowledge))
        .route("/knowledge/{entry_id}", delete(knowledge::delete_knowledge))
        .route(
            "/upload",
            post(upload::upload_document).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/stats", get(stats::get_stats))
}
