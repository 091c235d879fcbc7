use serde::{Deserialize, Serialize};

/// Filter accepted by `Store::query_messages` (spec §4.1).
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub session_key: Option<String>,
    pub channel: Option<String>,
    pub sender_id: Option<String>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub content_match: Option<String>,
    pub include_deleted: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Filter accepted by `Store::query_sessions`.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub session_type: Option<String>,
    pub status: Option<String>,
    pub agent_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Filter accepted by `Store::session_events`.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub include_thinking: bool,
    pub include_usage: bool,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub types: Option<Vec<String>>,
}

/// Result of a batch message insert (spec §4.1 `insert_messages_batch`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MessageBatchResult {
    pub inserted: usize,
    pub skipped: usize,
}

/// Result of a batch event insert (spec §4.1 `insert_events_batch`). `errors`
/// counts rows dropped for reasons other than a uniqueness conflict, e.g.
/// foreign-key violations under non-force scans (spec §7 `ReferentialError`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EventBatchResult {
    pub inserted: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// One row of `list_sessions` as derived directly from the `events` table
/// (spec §4.6), independent of whether a Session row has been upserted yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventSessionSummary {
    pub session_id: String,
    pub session_key: String,
    pub event_count: i64,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

/// Aggregate statistics for one session (spec §4.1 `session_stats`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_events: i64,
    pub message_count: i64,
    pub tool_call_count: i64,
    pub error_count: i64,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub duration_seconds: Option<i64>,
    pub total_size_bytes: i64,
    pub total_tokens: i64,
    pub total_cost: f64,
}
