use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

use archivist_types::identity::{generate_message_id, message_fingerprint};
use archivist_types::{ContentType, Direction, Message};

use crate::Result;

/// Parses a WhatsApp "export chat" plain-text file into normalized Message
/// records (spec §4.4). Tolerates both the US-style 12-hour header
/// (`MM/DD/YY, HH:MM AM|PM - Sender: ...`) and the bracketed 24-hour header
/// (`[DD/MM/YY, HH:MM:SS] Sender: ...`); lines that match neither are
/// continuation lines joined onto the preceding message.
pub fn parse_whatsapp_export(path: &Path) -> Result<Vec<Message>> {
    let text = std::fs::read_to_string(path)?;
    let session_key = "imported:whatsapp:export".to_string();

    let mut out: Vec<Message> = Vec::new();
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(header) = match_header(line) {
            out.push(build_message(&header, &session_key));
        } else if let Some(last) = out.last_mut() {
            if !line.trim().is_empty() {
                let appended = format!("{}\n{}", last.content_text.clone().unwrap_or_default(), line);
                last.content_text = Some(appended);
            }
        }
    }
    Ok(out)
}

struct ParsedHeader {
    timestamp: i64,
    sender: String,
    body: String,
}

fn us_style_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(\d{1,2})/(\d{1,2})/(\d{2,4}), (\d{1,2}):(\d{2})\s*([AaPp][Mm]) - ([^:]+): (.*)$",
        )
        .unwrap()
    })
}

fn bracketed_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\[(\d{1,2})/(\d{1,2})/(\d{2,4}), (\d{1,2}):(\d{2}):(\d{2})\] ([^:]+): (.*)$").unwrap()
    })
}

fn match_header(line: &str) -> Option<ParsedHeader> {
    if let Some(caps) = us_style_regex().captures(line) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let year = normalize_year(&caps[3])?;
        let mut hour: u32 = caps[4].parse().ok()?;
        let minute: u32 = caps[5].parse().ok()?;
        let meridiem = caps[6].to_ascii_uppercase();
        if meridiem == "PM" && hour != 12 {
            hour += 12;
        } else if meridiem == "AM" && hour == 12 {
            hour = 0;
        }
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
        let dt = NaiveDateTime::new(date, time);
        return Some(ParsedHeader {
            timestamp: dt.and_utc().timestamp_millis(),
            sender: caps[7].trim().to_string(),
            body: caps[8].to_string(),
        });
    }

    if let Some(caps) = bracketed_regex().captures(line) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year = normalize_year(&caps[3])?;
        let hour: u32 = caps[4].parse().ok()?;
        let minute: u32 = caps[5].parse().ok()?;
        let second: u32 = caps[6].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let time = NaiveTime::from_hms_opt(hour, minute, second)?;
        let dt = NaiveDateTime::new(date, time);
        return Some(ParsedHeader {
            timestamp: dt.and_utc().timestamp_millis(),
            sender: caps[7].trim().to_string(),
            body: caps[8].to_string(),
        });
    }

    None
}

fn normalize_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    Some(if year < 100 { year + 2000 } else { year })
}

fn build_message(header: &ParsedHeader, session_key: &str) -> Message {
    let direction = if header.sender == "You" {
        Direction::Outbound
    } else {
        Direction::Inbound
    };
    let content_type = if header.body.contains("<Media omitted>") || header.body.contains("(file attached)") {
        ContentType::Document
    } else {
        ContentType::Text
    };

    let message_id = format!(
        "whatsapp:{}",
        generate_message_id(&header.sender, header.timestamp, &header.body)
    );
    let fingerprint = message_fingerprint(&header.sender, header.timestamp, &header.body);

    Message {
        message_id,
        internal_id: None,
        session_key: session_key.to_string(),
        session_id: None,
        direction,
        sender_id: Some(header.sender.clone()),
        sender_name: Some(header.sender.clone()),
        recipient_id: None,
        recipient_name: None,
        channel: "whatsapp".to_string(),
        device_id: None,
        content_type,
        content_text: Some(header.body.clone()),
        raw_json: serde_json::json!({ "sender": header.sender, "text": header.body }),
        fingerprint,
        reply_to_id: None,
        thread_id: None,
        timestamp: header.timestamp,
        edited_at: None,
        deleted_at: None,
        ingested_at: crate::common::now_millis(),
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
    fn parses_both_date_formats_with_monotonic_timestamps() {
        let export = "12/31/23, 10:30 PM - Alice: Hi\n[31/12/23, 22:31:00] Bob: Hello\n";
        let f = write_export(export);
        let messages = parse_whatsapp_export(f.path()).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender_name.as_deref(), Some("Alice"));
        assert_eq!(messages[1].sender_name.as_deref(), Some("Bob"));
        assert!(messages[0].timestamp <= messages[1].timestamp);
        assert!(messages.iter().all(|m| m.channel == "whatsapp"));
    }

    #[test]
    fn continuation_lines_join_onto_preceding_message() {
        let export = "12/31/23, 10:30 PM - Alice: first line\nsecond line\nthird line\n";
        let f = write_export(export);
        let messages = parse_whatsapp_export(f.path()).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].content_text.as_deref(),
            Some("first line\nsecond line\nthird line")
        );
    }

    #[test]
    fn self_sender_is_outbound() {
        let export = "12/31/23, 10:30 PM - You: sent this\n";
        let f = write_export(export);
        let messages = parse_whatsapp_export(f.path()).unwrap();
        assert_eq!(messages[0].direction, Direction::Outbound);
    }
}
