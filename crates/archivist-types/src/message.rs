use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Direction of a message relative to the archiving system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Content type tag for a Message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    Image,
    Video,
    Audio,
    Document,
    Sticker,
    Location,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::Video => "video",
            ContentType::Audio => "audio",
            ContentType::Document => "document",
            ContentType::Sticker => "sticker",
            ContentType::Location => "location",
        }
    }
}

/// A point-in-time communication in a human chat channel (or an imported
/// historical one). See spec §3 "Message".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: String,
    pub internal_id: Option<String>,
    pub session_key: String,
    pub session_id: Option<String>,
    pub direction: Direction,
    pub sender_id: Option<String>,
    pub sender_name: Option<String>,
    pub recipient_id: Option<String>,
    pub recipient_name: Option<String>,
    pub channel: String,
    pub device_id: Option<String>,
    pub content_type: ContentType,
    pub content_text: Option<String>,
    pub raw_json: Value,
    pub fingerprint: String,
    pub reply_to_id: Option<String>,
    pub thread_id: Option<String>,
    pub timestamp: i64,
    pub edited_at: Option<i64>,
    pub deleted_at: Option<i64>,
    pub ingested_at: i64,
}

/// Media associated with a Message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Option<i64>,
    pub message_id: String,
    pub attachment_type: String,
    pub file_path: Option<String>,
    pub url: Option<String>,
    pub filename: Option<String>,
    pub size_bytes: Option<i64>,
    pub mime_type: Option<String>,
    pub thumbnail_path: Option<String>,
    pub metadata: Option<Value>,
    pub created_at: i64,
}

/// A tuple (Message, emoji, user) with add/remove timestamps. At most one
/// active reaction per (message, emoji, user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    pub message_id: String,
    pub emoji: String,
    pub user_id: String,
    pub user_name: Option<String>,
    pub added_at: i64,
    pub removed_at: Option<i64>,
}

/// An append-only record of a prior version of a Message's content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edit {
    pub id: Option<i64>,
    pub message_id: String,
    pub previous_content: Option<String>,
    pub edited_at: i64,
}
