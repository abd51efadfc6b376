//! Request and response bodies of the HTTP API

pub mod chat;
pub mod error;
pub mod json;
pub mod knowledge;

pub use chat::{ChatMessage, ChatRequest, ChatResponse};
pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use knowledge::{
    DeleteResponse, KnowledgeItem, KnowledgeListResponse, KnowledgeRequest, KnowledgeResponse,
    StatsResponse, UploadResponse,
};
