use archivist_store::{EventFilter, Store};

use crate::domain::SessionDetail;
use crate::Result;

/// `session_detail(session_id)` (spec §4.6): Session row (if upserted) +
/// computed stats + events, in one call.
pub fn session_detail(store: &Store, session_id: &str, filter: &EventFilter) -> Result<SessionDetail> {
    let session = store.get_session(session_id)?;
    let stats = store.session_stats(session_id)?;
    let events = store.session_events(session_id, filter)?;
    Ok(SessionDetail { session, stats, events })
}

#[cfg(test)]
mod tests {
    use archivist_types::{Event, EventType};
    use serde_json::json;

    use super::*;

    #[test]
    fn detail_reports_stats_even_without_a_sessions_row() {
        let store = Store::open_in_memory().unwrap();
        let event = Event {
            event_id: "M".to_string(),
            parent_event_id: None,
            session_key: "agent:main:main".to_string(),
            session_id: Some("S1".to_string()),
            event_type: EventType::Message,
            event_subtype: None,
            timestamp: 1000,
            ingested_at: 1000,
            raw_json: json!({}),
            role: Some("user".to_string()),
            tool_name: None,
            model_provider: None,
            model_id: None,
            is_error: false,
            size_bytes: 20,
        };
        store.insert_event(&event, "agent:main:main", false, false).unwrap();

        let detail = session_detail(&store, "S1", &EventFilter::default()).unwrap();
        assert!(detail.session.is_none());
        assert_eq!(detail.stats.total_events, 1);
        assert_eq!(detail.events.len(), 1);
    }
}
