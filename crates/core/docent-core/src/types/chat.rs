//! Chat room and message types

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Speaker of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The human asking
    User,
    /// The answering assistant
    Assistant,
}

impl ChatRole {
    /// Wire string for this role
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// User rating of an assistant answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Evaluation {
    /// Not rated
    #[default]
    None,
    /// Rated helpful
    Good,
    /// Rated unhelpful
    Bad,
}

impl Evaluation {
    /// Wire string for this rating
    pub fn as_str(&self) -> &'static str {
        match self {
            Evaluation::None => "none",
            Evaluation::Good => "good",
            Evaluation::Bad => "bad",
        }
    }
}

/// A chat room as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRoom {
    /// Room ID (opaque server string)
    pub id: String,

    /// Display name
    pub name: String,

    /// Custom assistant prompt saved on the room
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,

    /// Whether the custom prompt is applied to new messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active_custom_prompt: Option<bool>,

    /// Creation time
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,

    /// Last update time
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// A persisted chat message as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message ID
    #[serde(default)]
    pub id: Option<String>,

    /// Owning room ID
    #[serde(default)]
    pub chat_room_id: Option<String>,

    /// Speaker
    pub role: ChatRole,

    /// Message text
    pub message: String,

    /// Stored reference labels (display strings, not the live pair form)
    #[serde(default)]
    pub references: Vec<String>,

    /// User rating
    #[serde(default)]
    pub evaluation: Evaluation,

    /// Custom prompt active when this message was sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_prompt: Option<String>,

    /// Model that produced the answer
    #[serde(default)]
    pub model: Option<String>,

    /// Search index selection active when this message was sent
    #[serde(default)]
    pub index_types: Option<Vec<IndexTypeDetail>>,

    /// Creation time
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// One entry of the conversation history sent with a new message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    /// Speaker of the entry
    #[serde(rename = "type")]
    pub kind: ChatRole,

    /// Entry text
    pub content: String,
}

/// Search index selection detail sent with a new message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexTypeDetail {
    /// Index type ID
    pub id: String,

    /// Human-readable folder name
    pub folder_name: String,
}

/// Request body for sending a chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageRequest {
    /// Target room
    pub chat_room_id: String,

    /// The user's message
    pub message: String,

    /// Custom assistant prompt, when one is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_prompt: Option<String>,

    /// Whether the custom prompt applies to this message
    pub is_active_assistant_prompt: bool,

    /// Prior turns of the conversation
    pub chat_history: Vec<HistoryItem>,

    /// Selected search index IDs
    pub index_type: Vec<String>,

    /// Selected search indexes with display names
    pub index_type_details: Vec<IndexTypeDetail>,

    /// Model to answer with
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_use_lowercase_wire_strings() {
        assert_eq!(serde_json::to_string(&ChatRole::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&ChatRole::Assistant).unwrap(),
            "\"assistant\""
        );
        assert_eq!(Evaluation::Good.as_str(), "good");
        assert_eq!(Evaluation::default(), Evaluation::None);
    }

    #[test]
    fn test_chat_room_parses_server_shape() {
        let room: ChatRoom = serde_json::from_str(
            r#"{
                "id": "01J0ABC",
                "user_id": "u-1",
                "name": "New Chat",
                "custom_prompt": null,
                "is_active_custom_prompt": false,
                "created_at": "2025-07-01T10:00:00",
                "updated_at": "2025-07-01T10:05:00"
            }"#,
        )
        .unwrap();
        assert_eq!(room.name, "New Chat");
        assert_eq!(room.is_active_custom_prompt, Some(false));
        assert!(room.created_at.is_some());
    }

    #[test]
    fn test_history_item_uses_type_key() {
        let item = HistoryItem {
            kind: ChatRole::Assistant,
            content: "hello".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&item).unwrap(),
            r#"{"type":"assistant","content":"hello"}"#
        );
    }

    #[test]
    fn test_message_request_serializes_full_body() {
        let req = ChatMessageRequest {
            chat_room_id: "room-1".to_string(),
            message: "what changed?".to_string(),
            assistant_prompt: None,
            is_active_assistant_prompt: false,
            chat_history: vec![],
            index_type: vec!["idx-1".to_string()],
            index_type_details: vec![IndexTypeDetail {
                id: "idx-1".to_string(),
                folder_name: "Manuals".to_string(),
            }],
            model: "gpt-4o-mini".to_string(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["chat_room_id"], "room-1");
        assert_eq!(value["index_type"][0], "idx-1");
        assert_eq!(value["index_type_details"][0]["folder_name"], "Manuals");
        // Absent prompt is omitted, not null
        assert!(value.get("assistant_prompt").is_none());
    }
}
