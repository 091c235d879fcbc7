use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Main,
    Subagent,
    Cron,
    Isolated,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Main => "main",
            SessionType::Subagent => "subagent",
            SessionType::Cron => "cron",
            SessionType::Isolated => "isolated",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "main" => SessionType::Main,
            "subagent" => SessionType::Subagent,
            "cron" => SessionType::Cron,
            "isolated" => SessionType::Isolated,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "active" => SessionStatus::Active,
            "completed" => SessionStatus::Completed,
            "failed" => SessionStatus::Failed,
            _ => return None,
        })
    }
}

/// A high-level summary row per session (spec §3 "Session").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub session_key: String,
    pub session_type: SessionType,
    pub parent_session_id: Option<String>,
    pub label: Option<String>,
    pub agent_id: Option<String>,
    pub model: Option<String>,
    pub started_at: i64,
    pub ended_at: Option<i64>,
    pub status: SessionStatus,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub message_count: i64,
    pub event_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}
