//! Chat request and response bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::conversation::{ConversationTurn, Role};
use crate::domain::retrieval::Answer;

/// One prior message sent back by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<ChatMessage> for ConversationTurn {
    fn from(message: ChatMessage) -> Self {
        let turn = ConversationTurn::new(message.role, message.content);

        match message.timestamp {
            Some(timestamp) => ConversationTurn { timestamp, ..turn },
            None => turn,
        }
    }
}

/// `POST /api/v1/chat`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Option<Vec<ChatMessage>>,
}

impl ChatRequest {
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.conversation_history
            .iter()
            .flatten()
            .cloned()
            .map(ConversationTurn::from)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub sources: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<Answer> for ChatResponse {
    fn from(answer: Answer) -> Self {
        Self {
            response: answer.response,
            sources: answer.sources,
            timestamp: answer.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_defaults_to_empty() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"message": "What color is the sky?"}"#).unwrap();

        assert!(request.history().is_empty());
    }

    #[test]
    fn test_null_history_accepted() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"message": "Hi", "conversation_history": null}"#).unwrap();

        assert!(request.history().is_empty());
    }

    #[test]
    fn test_history_converted_in_order() {
        let request: ChatRequest = serde_json::from_str(
            r#"{
                "message": "And grass?",
                "conversation_history": [
                    {"role": "user", "content": "What color is the sky?"},
                    {"role": "assistant", "content": "Blue.", "timestamp": "2024-05-01T10:00:00Z"}
                ]
            }"#,
        )
        .unwrap();

        let history = request.history();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].content, "Blue.");
        assert_eq!(history[1].timestamp.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result: Result<ChatRequest, _> = serde_json::from_str(
            r#"{"message": "Hi", "conversation_history": [{"role": "system", "content": "x"}]}"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_response_from_answer() {
        let answer = Answer::new("The sky is blue.", vec!["The sky is blue".to_string()]);

        let json = serde_json::to_value(ChatResponse::from(answer)).unwrap();

        assert_eq!(json["response"], "The sky is blue.");
        assert_eq!(json["sources"][0], "The sky is blue");
        assert!(json["timestamp"].is_string());
    }
}
