use archivist_types::{Event, EventType};

/// Session-level metadata derived from a batch of parsed events (spec §4.3
/// "a helper on the parser derives session-level metadata from the
/// accumulated events").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionMetadata {
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
    pub event_count: usize,
    pub has_thinking: bool,
    pub has_usage: bool,
    pub tool_call_count: usize,
    pub error_count: usize,
}

pub fn derive_session_metadata(events: &[Event]) -> SessionMetadata {
    let mut meta = SessionMetadata {
        event_count: events.len(),
        ..Default::default()
    };

    for event in events {
        meta.first_timestamp = Some(
            meta.first_timestamp
                .map_or(event.timestamp, |t| t.min(event.timestamp)),
        );
        meta.last_timestamp = Some(
            meta.last_timestamp
                .map_or(event.timestamp, |t| t.max(event.timestamp)),
        );
        match event.event_type {
            EventType::ThinkingBlock => meta.has_thinking = true,
            EventType::UsageStats => meta.has_usage = true,
            EventType::ToolCall => meta.tool_call_count += 1,
            _ => {}
        }
        if event.is_error {
            meta.error_count += 1;
        }
    }

    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::EventLogParser;
    use std::io::Cursor;

    #[test]
    fn aggregates_across_a_fanned_out_message() {
        let line = r#"{"type":"message","id":"M","timestamp":"2026-02-13T12:00:00.000Z",
            "message":{"role":"assistant","content":[
                {"type":"toolCall","id":"T1","name":"exec","arguments":{}}
            ],"usage":{"input":10,"output":5,"totalTokens":15}}}"#;
        let events: Vec<_> = EventLogParser::from_reader(Cursor::new(line.as_bytes()), None).collect();
        let meta = derive_session_metadata(&events);
        assert_eq!(meta.event_count, 3);
        assert_eq!(meta.tool_call_count, 1);
        assert!(meta.has_usage);
        assert!(!meta.has_thinking);
    }
}
