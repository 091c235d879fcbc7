use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of archive event types (spec §3 "Event").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Session,
    ModelChange,
    ThinkingLevelChange,
    Custom,
    Message,
    ToolCall,
    ToolResult,
    ThinkingBlock,
    UsageStats,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Session => "session",
            EventType::ModelChange => "model_change",
            EventType::ThinkingLevelChange => "thinking_level_change",
            EventType::Custom => "custom",
            EventType::Message => "message",
            EventType::ToolCall => "tool_call",
            EventType::ToolResult => "tool_result",
            EventType::ThinkingBlock => "thinking_block",
            EventType::UsageStats => "usage_stats",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "session" => EventType::Session,
            "model_change" => EventType::ModelChange,
            "thinking_level_change" => EventType::ThinkingLevelChange,
            "custom" => EventType::Custom,
            "message" => EventType::Message,
            "tool_call" => EventType::ToolCall,
            "tool_result" => EventType::ToolResult,
            "thinking_block" => EventType::ThinkingBlock,
            "usage_stats" => EventType::UsageStats,
            _ => return None,
        })
    }

    /// Synthetic event types are derived from fields embedded in a parent
    /// `message` event rather than observed directly in the log (spec §4.3).
    pub fn is_synthetic(&self) -> bool {
        matches!(
            self,
            EventType::ToolCall | EventType::ThinkingBlock | EventType::UsageStats
        )
    }
}

/// A generic record in the event-log, lifted to a typed row (spec §3 "Event").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub parent_event_id: Option<String>,
    pub session_key: String,
    pub session_id: Option<String>,
    pub event_type: EventType,
    pub event_subtype: Option<String>,
    pub timestamp: i64,
    pub ingested_at: i64,
    pub raw_json: Value,
    pub role: Option<String>,
    pub tool_name: Option<String>,
    pub model_provider: Option<String>,
    pub model_id: Option<String>,
    pub is_error: bool,
    pub size_bytes: i64,
}

/// Satellite of a `thinking_block` Event. Factored out because the payload
/// is large and rarely needed on listing paths (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkingBlock {
    pub event_id: String,
    pub content: String,
    pub signature: Option<String>,
    pub size_bytes: i64,
    pub created_at: i64,
}

/// Satellite of a `usage_stats` Event (spec §3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageStats {
    pub event_id: String,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub cache_read_tokens: i64,
    pub cache_write_tokens: i64,
    pub total_tokens: i64,
    pub input_cost: f64,
    pub output_cost: f64,
    pub cache_read_cost: f64,
    pub cache_write_cost: f64,
    pub total_cost: f64,
    pub model_provider: Option<String>,
    pub model_id: Option<String>,
    pub timestamp: i64,
}
