use archivist_store::Store;

use crate::domain::{merge_list_entry, SessionListEntry};
use crate::Result;

/// `list_sessions()` (spec §4.6): grouped directly off the `events` table,
/// then enriched with the `Session` row's title/status where one has been
/// upserted by a `sessions`-mode scan.
pub fn list_sessions(store: &Store) -> Result<Vec<SessionListEntry>> {
    let summaries = store.list_event_sessions()?;
    let mut entries = Vec::with_capacity(summaries.len());
    for summary in summaries {
        let session = store.get_session(&summary.session_id)?;
        entries.push(merge_list_entry(summary, session.as_ref()));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use archivist_types::{Event, EventType};
    use serde_json::json;

    use super::*;

    fn event(id: &str, session_id: &str, ts: i64) -> Event {
        Event {
            event_id: id.to_string(),
            parent_event_id: None,
            session_key: "agent:main:main".to_string(),
            session_id: Some(session_id.to_string()),
            event_type: EventType::Session,
            event_subtype: None,
            timestamp: ts,
            ingested_at: ts,
            raw_json: json!({}),
            role: None,
            tool_name: None,
            model_provider: None,
            model_id: None,
            is_error: false,
            size_bytes: 10,
        }
    }

    #[test]
    fn lists_sessions_without_a_sessions_row() {
        let store = Store::open_in_memory().unwrap();
        store.insert_event(&event("A", "S1", 1000), "agent:main:main", false, false).unwrap();
        store.insert_event(&event("B", "S1", 2000), "agent:main:main", false, false).unwrap();

        let entries = list_sessions(&store).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].session_id, "S1");
        assert_eq!(entries[0].event_count, 2);
        assert_eq!(entries[0].start_time, Some(1000));
        assert_eq!(entries[0].end_time, Some(2000));
        assert!(entries[0].title.is_none());
    }
}
