use std::path::Path;

use serde_json::Value;

use archivist_types::identity::message_fingerprint;
use archivist_types::timestamp::parse_iso8601_millis;
use archivist_types::{ContentType, Direction, Message};

use crate::error::Error;
use crate::Result;

/// Parses a Telegram Desktop "export chat history" JSON file into
/// normalized Message records (spec §4.4).
pub fn parse_telegram_export(path: &Path) -> Result<Vec<Message>> {
    let text = std::fs::read_to_string(path)?;
    let root: Value = serde_json::from_str(&text)?;

    let Some(messages) = root.get("messages").and_then(|v| v.as_array()) else {
        return Err(Error::InvalidTopLevel(
            "expected a top-level object with a `messages` array".to_string(),
        ));
    };

    let conversation_id = root
        .get("id")
        .map(|v| v.to_string())
        .unwrap_or_else(|| "export".to_string());
    let session_key = format!("imported:telegram:{}", conversation_id);

    let mut out = Vec::with_capacity(messages.len());
    for raw in messages {
        // Telegram exports interleave `service` records (join/leave/pin
        // notices) with `message` records; only the latter map to a Message.
        if raw.get("type").and_then(|v| v.as_str()) != Some("message") {
            continue;
        }
        if let Some(message) = build_message(raw, &session_key) {
            out.push(message);
        }
    }
    Ok(out)
}

fn build_message(raw: &Value, session_key: &str) -> Option<Message> {
    let tg_id = raw.get("id")?.to_string();
    let message_id = format!("telegram:{}", tg_id);

    let timestamp = raw
        .get("date_unixtime")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<i64>().ok())
        .map(|secs| secs * 1000)
        .or_else(|| {
            raw.get("date")
                .and_then(|v| v.as_str())
                .and_then(|s| parse_iso8601_millis(s).ok())
        })
        .unwrap_or(0);

    let from_id = raw.get("from_id").and_then(|v| v.as_str()).map(str::to_string);
    let from_name = raw.get("from").and_then(|v| v.as_str()).map(str::to_string);
    let direction = if from_id.as_deref() == Some("user_self") || from_name.as_deref() == Some("You") {
        Direction::Outbound
    } else {
        Direction::Inbound
    };

    let content_text = extract_text(raw);
    let content_type = infer_content_type(raw);

    let sender_id = from_id.clone().unwrap_or_else(|| "unknown".to_string());
    let fingerprint = message_fingerprint(&sender_id, timestamp, content_text.as_deref().unwrap_or(""));

    let reply_to_id = raw
        .get("reply_to_message_id")
        .map(|v| v.to_string());

    Some(Message {
        message_id,
        internal_id: Some(tg_id),
        session_key: session_key.to_string(),
        session_id: None,
        direction,
        sender_id: from_id,
        sender_name: from_name,
        recipient_id: None,
        recipient_name: None,
        channel: "telegram".to_string(),
        device_id: None,
        content_type,
        content_text,
        raw_json: raw.clone(),
        fingerprint,
        reply_to_id,
        thread_id: None,
        timestamp,
        edited_at: None,
        deleted_at: None,
        ingested_at: crate::common::now_millis(),
    })
}

/// Concatenates formatted-text runs when `text` is a structured array
/// (plain strings interleaved with `{type, text}` entity objects); returns
/// the plain string directly otherwise.
fn extract_text(raw: &Value) -> Option<String> {
    match raw.get("text") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Array(parts)) => {
            let joined: String = parts
                .iter()
                .filter_map(|part| match part {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(_) => part.get("text").and_then(|v| v.as_str()).map(str::to_string),
                    _ => None,
                })
                .collect();
            if joined.is_empty() {
                None
            } else {
                Some(joined)
            }
        }
        _ => None,
    }
}

fn infer_content_type(raw: &Value) -> ContentType {
    if raw.get("location_information").is_some() {
        return ContentType::Location;
    }
    if let Some(media_type) = raw.get("media_type").and_then(|v| v.as_str()) {
        match media_type {
            "sticker" => return ContentType::Sticker,
            "video_file" | "video_message" | "round_video_message" => return ContentType::Video,
            "voice_message" | "audio_file" => return ContentType::Audio,
            _ => {}
        }
    }
    if raw.get("photo").is_some() {
        return ContentType::Image;
    }
    if let Some(mime) = raw.get("mime_type").and_then(|v| v.as_str()) {
        if mime.starts_with("image/") {
            return ContentType::Image;
        }
        if mime.starts_with("video/") {
            return ContentType::Video;
        }
        if mime.starts_with("audio/") {
            return ContentType::Audio;
        }
        return ContentType::Document;
    }
    if raw.get("file").is_some() {
        return ContentType::Document;
    }
    ContentType::Text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_export(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parses_plain_and_self_messages() {
        let export = r#"{
            "id": 555,
            "messages": [
                {"id": 1, "type": "message", "date": "2026-01-01T10:00:00", "date_unixtime": "1767261600",
                 "from": "Alice", "from_id": "user111", "text": "hi there"},
                {"id": 2, "type": "message", "date": "2026-01-01T10:01:00", "date_unixtime": "1767261660",
                 "from": "You", "from_id": "user_self", "text": "hello back"},
                {"id": 3, "type": "service", "action": "pin_message", "date": "2026-01-01T10:02:00", "date_unixtime": "1767261720"}
            ]
        }"#;
        let f = write_export(export);
        let messages = parse_telegram_export(f.path()).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].direction, Direction::Inbound);
        assert_eq!(messages[1].direction, Direction::Outbound);
        assert_eq!(messages[0].channel, "telegram");
        assert_eq!(messages[0].session_key, "imported:telegram:555");
    }

    #[test]
    fn structured_text_entities_are_concatenated() {
        let export = r#"{
            "id": 1,
            "messages": [
                {"id": 9, "type": "message", "date": "2026-01-01T00:00:00", "date_unixtime": "1767225600",
                 "from": "Bob", "from_id": "user2",
                 "text": ["check ", {"type": "bold", "text": "this"}, " out"]}
            ]
        }"#;
        let f = write_export(export);
        let messages = parse_telegram_export(f.path()).unwrap();
        assert_eq!(messages[0].content_text.as_deref(), Some("check this out"));
    }

    #[test]
    fn repeat_import_is_idempotent_at_the_record_level() {
        let export = r#"{"id": 1, "messages": [
            {"id": 9, "type": "message", "date_unixtime": "1767225600", "from": "Bob", "from_id": "user2", "text": "hi"}
        ]}"#;
        let f = write_export(export);
        let first = parse_telegram_export(f.path()).unwrap();
        let second = parse_telegram_export(f.path()).unwrap();
        assert_eq!(first[0].message_id, second[0].message_id);
        assert_eq!(first[0].fingerprint, second[0].fingerprint);
    }

    #[test]
    fn invalid_top_level_structure_is_an_error() {
        let f = write_export(r#"{"not_messages": []}"#);
        assert!(parse_telegram_export(f.path()).is_err());
    }
}
