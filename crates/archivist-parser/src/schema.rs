//! Typed shapes of the event-log source records (spec §6 "Event-log format").
//! These mirror the wire JSON closely; the parser module lifts them into the
//! archive event model and is where any renaming/normalization happens.

use serde::Deserialize;
use serde_json::Value;

/// One line of an event-log file, discriminated on `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceRecord {
    Session(SessionRecord),
    ModelChange(ModelChangeRecord),
    ThinkingLevelChange(ThinkingLevelChangeRecord),
    Custom(CustomRecord),
    Message(MessageRecord),
    /// Any `type` outside the closed set (spec §4.3: "a record whose `type`
    /// is not recognized is skipped").
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    #[serde(default)]
    pub version: Option<i64>,
    pub timestamp: String,
    #[serde(default)]
    pub cwd: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelChangeRecord {
    pub id: String,
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<String>,
    pub timestamp: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(rename = "modelId", default)]
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThinkingLevelChangeRecord {
    pub id: String,
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<String>,
    pub timestamp: String,
    #[serde(rename = "thinkingLevel", default)]
    pub thinking_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomRecord {
    pub id: String,
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<String>,
    pub timestamp: String,
    #[serde(rename = "customType", default)]
    pub custom_type: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<String>,
    pub timestamp: String,
    pub message: MessageBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageBody {
    pub role: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<UsageBody>,
    #[serde(rename = "isError", default)]
    pub is_error: Option<bool>,
}

/// A single `content[]` item. Shape varies by `type` (`text`, `toolCall` /
/// `toolUse`, `thinking`, ...); fields that don't apply to a given block type
/// are simply absent.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub thinking: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub arguments: Option<Value>,
    #[serde(default)]
    pub input: Option<Value>,
}

impl ContentBlock {
    pub fn is_tool_call(&self) -> bool {
        self.block_type == "toolCall" || self.block_type == "toolUse"
    }

    pub fn is_thinking(&self) -> bool {
        self.block_type == "thinking"
    }

    /// `toolCall` blocks use `arguments`; `toolUse` blocks (Claude-style) use
    /// `input`. Either is accepted.
    pub fn tool_arguments(&self) -> Value {
        self.arguments
            .clone()
            .or_else(|| self.input.clone())
            .unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsageBody {
    #[serde(default)]
    pub input: i64,
    #[serde(default)]
    pub output: i64,
    #[serde(rename = "cacheRead", default)]
    pub cache_read: i64,
    #[serde(rename = "cacheWrite", default)]
    pub cache_write: i64,
    #[serde(rename = "totalTokens", default)]
    pub total_tokens: i64,
    #[serde(default)]
    pub cost: Option<UsageCost>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsageCost {
    #[serde(default)]
    pub input: f64,
    #[serde(default)]
    pub output: f64,
    #[serde(rename = "cacheRead", default)]
    pub cache_read: f64,
    #[serde(rename = "cacheWrite", default)]
    pub cache_write: f64,
    #[serde(default)]
    pub total: f64,
}
