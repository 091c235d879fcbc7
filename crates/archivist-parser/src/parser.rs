use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};

use archivist_types::timestamp::parse_iso8601_millis;
use archivist_types::{identity, Event, EventType};

use crate::error::{Error, Result};
use crate::schema::{ContentBlock, MessageBody, SourceRecord, UsageBody};

/// Streams one event-log file into a lazy, ordered sequence of archive
/// events (spec §4.3). Malformed lines and unrecognized `type`s are skipped,
/// not propagated; only a missing file is a hard error, raised at `open`
/// time.
///
/// `session_id` is left unset on every emitted event except the root
/// `session` event (where it equals the event id) — back-filling the rest is
/// the Scanner's job (spec §4.5).
pub struct EventLogParser<R> {
    lines: Lines<R>,
    watermark: Option<i64>,
    pending: VecDeque<Event>,
}

impl EventLogParser<BufReader<std::fs::File>> {
    /// Opens `path` for streaming. `watermark`, when set, restricts the
    /// sequence to events with `timestamp` strictly greater than it.
    pub fn open(path: &Path, watermark: Option<i64>) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| Error::MissingFile(path.to_path_buf(), e))?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            watermark,
            pending: VecDeque::new(),
        })
    }
}

impl<R: BufRead> EventLogParser<R> {
    /// Builds a parser directly over any buffered reader (tests, in-memory
    /// fixtures).
    pub fn from_reader(reader: R, watermark: Option<i64>) -> Self {
        Self {
            lines: reader.lines(),
            watermark,
            pending: VecDeque::new(),
        }
    }
}

impl<R: BufRead> Iterator for EventLogParser<R> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                if self.watermark.is_none_or(|w| event.timestamp > w) {
                    return Some(event);
                }
                continue;
            }

            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => {
                    eprintln!("archivist-parser: IO error reading line, stopping stream: {err}");
                    return None;
                }
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match parse_line(line) {
                Some(events) => self.pending.extend(events),
                None => {
                    eprintln!("archivist-parser: skipping malformed or unrecognized line");
                }
            }
        }
    }
}

/// Parses one non-empty line into zero or more archive events, applying the
/// `message` fan-out rule (spec §4.3). Returns `None` on malformed JSON or an
/// unrecognized record `type` — both are skip conditions, not errors.
fn parse_line(line: &str) -> Option<Vec<Event>> {
    let raw: Value = serde_json::from_str(line).ok()?;
    let record: SourceRecord = serde_json::from_value(raw.clone()).ok()?;
    let size_bytes = line.len() as i64;

    let events = match record {
        SourceRecord::Unknown => return None,
        SourceRecord::Session(rec) => {
            let timestamp = parse_iso8601_millis(&rec.timestamp).ok()?;
            vec![Event {
                event_id: rec.id.clone(),
                parent_event_id: None,
                session_key: String::new(),
                session_id: Some(rec.id),
                event_type: EventType::Session,
                event_subtype: None,
                timestamp,
                ingested_at: now_millis(),
                raw_json: raw,
                role: None,
                tool_name: None,
                model_provider: None,
                model_id: None,
                is_error: false,
                size_bytes,
            }]
        }
        SourceRecord::ModelChange(rec) => {
            let timestamp = parse_iso8601_millis(&rec.timestamp).ok()?;
            vec![Event {
                event_id: rec.id,
                parent_event_id: rec.parent_id,
                session_key: String::new(),
                session_id: None,
                event_type: EventType::ModelChange,
                event_subtype: None,
                timestamp,
                ingested_at: now_millis(),
                raw_json: raw,
                role: None,
                tool_name: None,
                model_provider: rec.provider,
                model_id: rec.model_id,
                is_error: false,
                size_bytes,
            }]
        }
        SourceRecord::ThinkingLevelChange(rec) => {
            let timestamp = parse_iso8601_millis(&rec.timestamp).ok()?;
            vec![Event {
                event_id: rec.id,
                parent_event_id: rec.parent_id,
                session_key: String::new(),
                session_id: None,
                event_type: EventType::ThinkingLevelChange,
                event_subtype: rec.thinking_level,
                timestamp,
                ingested_at: now_millis(),
                raw_json: raw,
                role: None,
                tool_name: None,
                model_provider: None,
                model_id: None,
                is_error: false,
                size_bytes,
            }]
        }
        SourceRecord::Custom(rec) => {
            let timestamp = parse_iso8601_millis(&rec.timestamp).ok()?;
            vec![Event {
                event_id: rec.id,
                parent_event_id: rec.parent_id,
                session_key: String::new(),
                session_id: None,
                event_type: EventType::Custom,
                event_subtype: rec.custom_type,
                timestamp,
                ingested_at: now_millis(),
                raw_json: raw,
                role: None,
                tool_name: None,
                model_provider: None,
                model_id: None,
                is_error: false,
                size_bytes,
            }]
        }
        SourceRecord::Message(rec) => {
            let timestamp = parse_iso8601_millis(&rec.timestamp).ok()?;
            fan_out_message(&rec.id, rec.parent_id, timestamp, &rec.message, &raw, size_bytes)
        }
    };

    Some(events)
}

/// Implements the `message` fan-out rule (spec §4.3, invariant I2/I4): the
/// parent `message` (or `tool_result` when its role is `toolResult`), plus,
/// for assistant messages, one event per `toolCall`/`toolUse` block, one
/// `thinking_block` if present, and one `usage_stats` if a usage object is
/// attached.
fn fan_out_message(
    id: &str,
    parent_id: Option<String>,
    timestamp: i64,
    message: &MessageBody,
    raw: &Value,
    size_bytes: i64,
) -> Vec<Event> {
    let primary_type = if message.role == "toolResult" {
        EventType::ToolResult
    } else {
        EventType::Message
    };

    let mut events = vec![Event {
        event_id: id.to_string(),
        parent_event_id: parent_id.clone(),
        session_key: String::new(),
        session_id: None,
        event_type: primary_type,
        event_subtype: None,
        timestamp,
        ingested_at: now_millis(),
        raw_json: raw.clone(),
        role: Some(message.role.clone()),
        tool_name: None,
        model_provider: message.provider.clone(),
        model_id: message.model.clone(),
        is_error: message.is_error.unwrap_or(false),
        size_bytes,
    }];

    if message.role != "assistant" {
        return events;
    }

    let mut thinking_emitted = false;
    for (idx, block) in message.content.iter().enumerate() {
        if block.is_tool_call() {
            events.push(tool_call_event(id, timestamp, idx, block));
        } else if block.is_thinking() && !thinking_emitted {
            events.push(thinking_block_event(id, timestamp, block));
            thinking_emitted = true;
        }
    }

    if let Some(usage) = &message.usage {
        events.push(usage_stats_event(id, timestamp, usage, message));
    }

    events
}

fn tool_call_event(parent_id: &str, timestamp: i64, index: usize, block: &ContentBlock) -> Event {
    let tool_block_id = block
        .id
        .clone()
        .unwrap_or_else(|| fallback_tool_block_id(index, block.name.as_deref()));
    let event_id = identity::tool_call_event_id(parent_id, &tool_block_id);
    let raw_json = json!({
        "id": tool_block_id,
        "name": block.name,
        "arguments": block.tool_arguments(),
    });
    let size_bytes = raw_json.to_string().len() as i64;

    Event {
        event_id,
        parent_event_id: Some(parent_id.to_string()),
        session_key: String::new(),
        session_id: None,
        event_type: EventType::ToolCall,
        event_subtype: None,
        timestamp,
        ingested_at: now_millis(),
        raw_json,
        role: Some("assistant".to_string()),
        tool_name: block.name.clone(),
        model_provider: None,
        model_id: None,
        is_error: false,
        size_bytes,
    }
}

fn thinking_block_event(parent_id: &str, timestamp: i64, block: &ContentBlock) -> Event {
    let event_id = identity::thinking_block_event_id(parent_id);
    let content = block.thinking.clone().unwrap_or_default();
    let raw_json = json!({
        "content": content,
        "signature": block.signature,
    });
    let size_bytes = raw_json.to_string().len() as i64;

    Event {
        event_id,
        parent_event_id: Some(parent_id.to_string()),
        session_key: String::new(),
        session_id: None,
        event_type: EventType::ThinkingBlock,
        event_subtype: None,
        timestamp,
        ingested_at: now_millis(),
        raw_json,
        role: Some("assistant".to_string()),
        tool_name: None,
        model_provider: None,
        model_id: None,
        is_error: false,
        size_bytes,
    }
}

/// Normalizes the source's `usage` field names (`input`, `cacheRead`,
/// `totalTokens`, ...) into the canonical storage shape the Store's satellite
/// extraction expects (`input_tokens`, `cache_read_tokens`, `total_tokens`,
/// ...).
fn usage_stats_event(parent_id: &str, timestamp: i64, usage: &UsageBody, message: &MessageBody) -> Event {
    let event_id = identity::usage_stats_event_id(parent_id);
    let cost = usage.cost.clone().unwrap_or_default();
    let raw_json = json!({
        "input_tokens": usage.input,
        "output_tokens": usage.output,
        "cache_read_tokens": usage.cache_read,
        "cache_write_tokens": usage.cache_write,
        "total_tokens": usage.total_tokens,
        "cost": {
            "input": cost.input,
            "output": cost.output,
            "cache_read": cost.cache_read,
            "cache_write": cost.cache_write,
            "total": cost.total,
        },
    });
    let size_bytes = raw_json.to_string().len() as i64;

    Event {
        event_id,
        parent_event_id: Some(parent_id.to_string()),
        session_key: String::new(),
        session_id: None,
        event_type: EventType::UsageStats,
        event_subtype: None,
        timestamp,
        ingested_at: now_millis(),
        raw_json,
        role: Some("assistant".to_string()),
        tool_name: None,
        model_provider: message.provider.clone(),
        model_id: message.model.clone(),
        is_error: false,
        size_bytes,
    }
}

/// Deterministic fallback when a tool-call block has no `id` of its own, so
/// reparsing the same line yields the same synthetic id (invariant I2/I5).
fn fallback_tool_block_id(index: usize, name: Option<&str>) -> String {
    format!("idx{}_{}", index, name.unwrap_or("tool"))
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse_all(input: &str) -> Vec<Event> {
        EventLogParser::from_reader(Cursor::new(input.as_bytes()), None).collect()
    }

    #[test]
    fn session_event_sets_its_own_session_id() {
        let line = r#"{"type":"session","id":"AAA","version":3,"timestamp":"2026-02-13T12:00:00.000Z","cwd":"/x"}"#;
        let events = parse_all(line);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_id, "AAA");
        assert_eq!(events[0].session_id.as_deref(), Some("AAA"));
        assert_eq!(events[0].event_type, EventType::Session);
    }

    #[test]
    fn blank_lines_and_malformed_json_are_skipped() {
        let input = "\n{not json}\n{\"type\":\"session\",\"id\":\"A\",\"timestamp\":\"2026-02-13T12:00:00.000Z\"}\n";
        let events = parse_all(input);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn unrecognized_type_is_skipped() {
        let input = r#"{"type":"something_else","id":"X","timestamp":"2026-02-13T12:00:00.000Z"}"#;
        assert!(parse_all(input).is_empty());
    }

    #[test]
    fn assistant_message_fans_out_tool_call_thinking_and_usage() {
        let line = r#"{"type":"message","id":"M","timestamp":"2026-02-13T12:00:00.000Z",
            "message":{"role":"assistant","content":[
                {"type":"toolCall","id":"T1","name":"exec","arguments":{}},
                {"type":"thinking","thinking":"pondering","signature":"sig"}
            ],"usage":{"input":100,"output":50,"totalTokens":150,"cost":{"total":0.003}}}}"#;
        let events = parse_all(line);
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].event_id, "M");
        assert_eq!(events[1].event_id, "M_tool_T1");
        assert_eq!(events[1].tool_name.as_deref(), Some("exec"));
        assert_eq!(events[2].event_id, "M_thinking");
        assert_eq!(events[3].event_id, "M_usage");
        for e in &events[1..] {
            assert_eq!(e.parent_event_id.as_deref(), Some("M"));
        }
    }

    #[test]
    fn user_message_never_fans_out() {
        let line = r#"{"type":"message","id":"U","timestamp":"2026-02-13T12:00:00.000Z",
            "message":{"role":"user","content":[{"type":"text","text":"hi"}]}}"#;
        let events = parse_all(line);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::Message);
    }

    #[test]
    fn tool_result_role_maps_to_tool_result_type() {
        let line = r#"{"type":"message","id":"R","parentId":"M","timestamp":"2026-02-13T12:00:00.000Z",
            "message":{"role":"toolResult","content":[],"isError":true}}"#;
        let events = parse_all(line);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::ToolResult);
        assert!(events[0].is_error);
    }

    #[test]
    fn watermark_filters_events_at_or_before_it() {
        let input = concat!(
            r#"{"type":"session","id":"A","timestamp":"2026-02-13T12:00:00.000Z"}"#,
            "\n",
            r#"{"type":"session","id":"B","timestamp":"2026-02-13T13:00:00.000Z"}"#,
        );
        let watermark = parse_iso8601_millis("2026-02-13T12:00:00.000Z").unwrap();
        let events: Vec<Event> =
            EventLogParser::from_reader(Cursor::new(input.as_bytes()), Some(watermark)).collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_id, "B");
    }

    #[test]
    fn synthetic_ids_are_stable_across_reparses() {
        let line = r#"{"type":"message","id":"M","timestamp":"2026-02-13T12:00:00.000Z",
            "message":{"role":"assistant","content":[{"type":"toolUse","id":"T1","name":"exec","input":{}}]}}"#;
        let first = parse_all(line);
        let second = parse_all(line);
        assert_eq!(first[1].event_id, second[1].event_id);
    }
}
