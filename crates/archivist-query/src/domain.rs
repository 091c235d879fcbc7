use serde::Serialize;

use archivist_store::EventSessionSummary;
use archivist_types::{Event, Session};

/// One row of `list_sessions` (spec §4.6): grouped off the `events` table so
/// a session is listable before (or even without) a `Session` row ever
/// being upserted, falling back to the upserted row's title/summary/status
/// when one exists.
#[derive(Debug, Clone, Serialize)]
pub struct SessionListEntry {
    pub session_id: String,
    pub session_key: String,
    pub event_count: i64,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub title: Option<String>,
    pub status: Option<String>,
}

pub(crate) fn merge_list_entry(summary: EventSessionSummary, session: Option<&Session>) -> SessionListEntry {
    SessionListEntry {
        session_id: summary.session_id,
        session_key: summary.session_key,
        event_count: summary.event_count,
        start_time: summary.start_time,
        end_time: summary.end_time,
        title: session.and_then(|s| s.title.clone()),
        status: session.map(|s| s.status.as_str().to_string()),
    }
}

/// `session_detail` (spec §4.6): the Session row (when one has been
/// upserted), computed stats, and the session's events in order.
#[derive(Debug, Clone, Serialize)]
pub struct SessionDetail {
    pub session: Option<Session>,
    pub stats: archivist_store::SessionStats,
    pub events: Vec<Event>,
}
