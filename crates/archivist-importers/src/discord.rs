use std::path::Path;

use serde_json::Value;

use archivist_types::identity::message_fingerprint;
use archivist_types::timestamp::parse_iso8601_millis;
use archivist_types::{ContentType, Direction, Message};

use crate::error::Error;
use crate::Result;

/// Parses a DiscordChatExporter-style JSON export into normalized Message
/// records (spec §4.4).
pub fn parse_discord_export(path: &Path) -> Result<Vec<Message>> {
    let text = std::fs::read_to_string(path)?;
    let root: Value = serde_json::from_str(&text)?;

    let Some(messages) = root.get("messages").and_then(|v| v.as_array()) else {
        return Err(Error::InvalidTopLevel(
            "expected a top-level object with a `messages` array".to_string(),
        ));
    };

    let channel_id = root
        .get("channel")
        .and_then(|c| c.get("id"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| "export".to_string());
    let session_key = format!("imported:discord:{}", channel_id);

    let mut out = Vec::with_capacity(messages.len());
    for raw in messages {
        if let Some(message) = build_message(raw, &session_key) {
            out.push(message);
        }
    }
    Ok(out)
}

fn build_message(raw: &Value, session_key: &str) -> Option<Message> {
    let discord_id = raw.get("id")?.as_str()?.to_string();
    let message_id = format!("discord:{}", discord_id);

    let timestamp = raw
        .get("timestamp")
        .and_then(|v| v.as_str())
        .and_then(|s| parse_iso8601_millis(s).ok())
        .unwrap_or(0);

    let author = raw.get("author");
    let sender_id = author.and_then(|a| a.get("id")).and_then(|v| v.as_str()).map(str::to_string);
    let sender_name = author
        .and_then(|a| a.get("name"))
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let is_bot = author
        .and_then(|a| a.get("isBot"))
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let direction = if is_bot { Direction::Outbound } else { Direction::Inbound };

    let content_text = raw
        .get("content")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let content_type = infer_content_type(raw);

    let reply_to_id = raw
        .get("reference")
        .and_then(|r| r.get("messageId"))
        .and_then(|v| v.as_str())
        .map(str::to_string);

    let fingerprint_sender = sender_id.clone().unwrap_or_else(|| "unknown".to_string());
    let fingerprint = message_fingerprint(&fingerprint_sender, timestamp, content_text.as_deref().unwrap_or(""));

    Some(Message {
        message_id,
        internal_id: Some(discord_id),
        session_key: session_key.to_string(),
        session_id: None,
        direction,
        sender_id,
        sender_name,
        recipient_id: None,
        recipient_name: None,
        channel: "discord".to_string(),
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

/// Derives content type from the first attachment's MIME type (or file
/// extension when MIME is absent); falls back to `Text` when there are no
/// attachments at all.
fn infer_content_type(raw: &Value) -> ContentType {
    let Some(attachment) = raw
        .get("attachments")
        .and_then(|v| v.as_array())
        .and_then(|a| a.first())
    else {
        return ContentType::Text;
    };

    if let Some(mime) = attachment.get("mimeType").or_else(|| attachment.get("contentType")).and_then(|v| v.as_str()) {
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

    let file_name = attachment
        .get("fileName")
        .or_else(|| attachment.get("filename"))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match file_name.rsplit('.').next().unwrap_or_default() {
        "png" | "jpg" | "jpeg" | "gif" | "webp" => ContentType::Image,
        "mp4" | "mov" | "webm" => ContentType::Video,
        "mp3" | "ogg" | "wav" | "m4a" => ContentType::Audio,
        _ => ContentType::Document,
    }
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
    fn bot_author_is_outbound() {
        let export = r#"{
            "channel": {"id": "42", "name": "general"},
            "messages": [
                {"id": "1", "timestamp": "2026-01-01T00:00:00.000Z", "content": "hi",
                 "author": {"id": "9", "name": "bob", "isBot": false}},
                {"id": "2", "timestamp": "2026-01-01T00:01:00.000Z", "content": "reply",
                 "author": {"id": "10", "name": "archivebot", "isBot": true}, "reference": {"messageId": "1"}}
            ]
        }"#;
        let f = write_export(export);
        let messages = parse_discord_export(f.path()).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].direction, Direction::Inbound);
        assert_eq!(messages[1].direction, Direction::Outbound);
        assert_eq!(messages[1].reply_to_id.as_deref(), Some("1"));
        assert_eq!(messages[0].session_key, "imported:discord:42");
    }
}
