use rusqlite::{params, Connection, OptionalExtension, Row};

use archivist_types::{Attachment, ContentType, Direction, Message};

use crate::records::MessageFilter;
use crate::Result;

pub fn exists_by_id(conn: &Connection, message_id: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM messages WHERE message_id = ?1",
        [message_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn exists_by_fingerprint(conn: &Connection, fingerprint: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM messages WHERE fingerprint = ?1",
        [fingerprint],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Stage-3 of the duplicate predicate (spec §4.2): same sender, same text,
/// timestamps strictly within 1000ms (`|Δ| < 1000`, not inclusive). Prefiltered
/// by the `(sender_id, timestamp)` index so it never scans the whole table,
/// then the exact delta is checked in Rust to enforce the strict bound.
pub fn exists_near_duplicate(
    conn: &Connection,
    sender_id: &str,
    content_text: &str,
    timestamp: i64,
) -> Result<bool> {
    let mut stmt = conn.prepare(
        r#"
        SELECT content_text, timestamp FROM messages
        WHERE sender_id = ?1 AND timestamp BETWEEN ?2 AND ?3
        "#,
    )?;
    let mut rows = stmt.query(params![sender_id, timestamp - 999, timestamp + 999])?;
    while let Some(row) = rows.next()? {
        let existing_text: Option<String> = row.get(0)?;
        let existing_ts: i64 = row.get(1)?;
        if existing_text.as_deref() == Some(content_text) && (existing_ts - timestamp).abs() < 1000 {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn insert_row(conn: &Connection, message: &Message) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO messages (
            message_id, internal_id, session_key, session_id, direction,
            sender_id, sender_name, recipient_id, recipient_name, channel,
            device_id, content_type, content_text, raw_json, fingerprint,
            reply_to_id, thread_id, timestamp, edited_at, deleted_at, ingested_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
            ?16, ?17, ?18, ?19, ?20, ?21
        )
        "#,
        params![
            message.message_id,
            message.internal_id,
            message.session_key,
            message.session_id,
            direction_str(message.direction),
            message.sender_id,
            message.sender_name,
            message.recipient_id,
            message.recipient_name,
            message.channel,
            message.device_id,
            content_type_str(message.content_type),
            message.content_text,
            message.raw_json.to_string(),
            message.fingerprint,
            message.reply_to_id,
            message.thread_id,
            message.timestamp,
            message.edited_at,
            message.deleted_at,
            message.ingested_at,
        ],
    )?;
    Ok(())
}

pub fn insert_attachment(conn: &Connection, attachment: &Attachment) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO attachments (
            message_id, attachment_type, file_path, url, filename, size_bytes,
            mime_type, thumbnail_path, metadata, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
        params![
            attachment.message_id,
            attachment.attachment_type,
            attachment.file_path,
            attachment.url,
            attachment.filename,
            attachment.size_bytes,
            attachment.mime_type,
            attachment.thumbnail_path,
            attachment.metadata.as_ref().map(|v| v.to_string()),
            attachment.created_at,
        ],
    )?;
    Ok(())
}

/// Returns `false` if no message with this id exists (no-op per spec).
pub fn update_content(
    conn: &Connection,
    message_id: &str,
    new_content: &str,
    edited_at: i64,
) -> Result<bool> {
    let previous: Option<Option<String>> = conn
        .query_row(
            "SELECT content_text FROM messages WHERE message_id = ?1",
            [message_id],
            |row| row.get(0),
        )
        .optional()?;

    let Some(previous_content) = previous else {
        return Ok(false);
    };

    conn.execute(
        "INSERT INTO edits (message_id, previous_content, edited_at) VALUES (?1, ?2, ?3)",
        params![message_id, previous_content, edited_at],
    )?;

    conn.execute(
        "UPDATE messages SET content_text = ?1, edited_at = ?2 WHERE message_id = ?3",
        params![new_content, edited_at, message_id],
    )?;

    Ok(true)
}

pub fn soft_delete(conn: &Connection, message_id: &str, when: i64) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE messages SET deleted_at = ?1 WHERE message_id = ?2 AND deleted_at IS NULL",
        params![when, message_id],
    )?;
    Ok(changed > 0)
}

pub fn add_reaction(
    conn: &Connection,
    message_id: &str,
    emoji: &str,
    user_id: &str,
    user_name: Option<&str>,
    now: i64,
) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO reactions (message_id, emoji, user_id, user_name, added_at, removed_at)
        VALUES (?1, ?2, ?3, ?4, ?5, NULL)
        ON CONFLICT(message_id, emoji, user_id) DO UPDATE SET
            user_name = COALESCE(?4, user_name),
            added_at = ?5,
            removed_at = NULL
        "#,
        params![message_id, emoji, user_id, user_name, now],
    )?;
    Ok(())
}

/// Sets `removed_at` only if a currently-active reaction exists, per spec.
pub fn remove_reaction(
    conn: &Connection,
    message_id: &str,
    emoji: &str,
    user_id: &str,
    when: i64,
) -> Result<bool> {
    let changed = conn.execute(
        r#"
        UPDATE reactions SET removed_at = ?1
        WHERE message_id = ?2 AND emoji = ?3 AND user_id = ?4 AND removed_at IS NULL
        "#,
        params![when, message_id, emoji, user_id],
    )?;
    Ok(changed > 0)
}

/// Builds and runs the dynamic `query_messages` filter (spec §4.1). When
/// `content_match` is set, joins through `messages_fts` instead of scanning.
pub fn select_filtered(conn: &Connection, filter: &MessageFilter) -> Result<Vec<Message>> {
    let mut clauses: Vec<String> = Vec::new();
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    let from = if filter.content_match.is_some() {
        "messages m JOIN messages_fts f ON f.message_id = m.message_id".to_string()
    } else {
        "messages m".to_string()
    };

    if let Some(query) = &filter.content_match {
        clauses.push("f.content MATCH ?".to_string());
        args.push(Box::new(query.clone()));
    }
    if !filter.include_deleted {
        clauses.push("m.deleted_at IS NULL".to_string());
    }
    if let Some(session_key) = &filter.session_key {
        clauses.push("m.session_key = ?".to_string());
        args.push(Box::new(session_key.clone()));
    }
    if let Some(channel) = &filter.channel {
        clauses.push("m.channel = ?".to_string());
        args.push(Box::new(channel.clone()));
    }
    if let Some(sender_id) = &filter.sender_id {
        clauses.push("m.sender_id = ?".to_string());
        args.push(Box::new(sender_id.clone()));
    }
    if let Some(start) = filter.start_time {
        clauses.push("m.timestamp >= ?".to_string());
        args.push(Box::new(start));
    }
    if let Some(end) = filter.end_time {
        clauses.push("m.timestamp <= ?".to_string());
        args.push(Box::new(end));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let limit = filter.limit.unwrap_or(200);
    let offset = filter.offset.unwrap_or(0);

    let sql = format!(
        "SELECT m.* FROM {} {} ORDER BY m.timestamp DESC LIMIT {} OFFSET {}",
        from, where_sql, limit, offset
    );

    let mut stmt = conn.prepare(&sql)?;
    let params_ref: Vec<&dyn rusqlite::ToSql> = args.iter().map(|b| b.as_ref()).collect();
    let rows = stmt
        .query_map(params_ref.as_slice(), row_to_message)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Ranked full-text search over message content (spec §4.1 `search`).
pub fn search(conn: &Connection, query: &str, limit: i64) -> Result<Vec<Message>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT m.* FROM messages m
        JOIN messages_fts f ON f.message_id = m.message_id
        WHERE f.content MATCH ?1 AND m.deleted_at IS NULL
        ORDER BY rank
        LIMIT ?2
        "#,
    )?;
    let rows = stmt
        .query_map(params![query, limit], row_to_message)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Lexically ordered transcript for LLM consumption (spec §4.1
/// `conversation_context`).
pub fn conversation_context(
    conn: &Connection,
    start: i64,
    end: i64,
    session_key: &str,
) -> Result<String> {
    let mut stmt = conn.prepare(
        r#"
        SELECT sender_name, sender_id, content_text, timestamp FROM messages
        WHERE session_key = ?1 AND timestamp BETWEEN ?2 AND ?3 AND deleted_at IS NULL
        ORDER BY timestamp ASC
        "#,
    )?;
    let mut rows = stmt.query(params![session_key, start, end])?;

    let mut lines = Vec::new();
    while let Some(row) = rows.next()? {
        let sender_name: Option<String> = row.get(0)?;
        let sender_id: Option<String> = row.get(1)?;
        let content_text: Option<String> = row.get(2)?;
        let who = sender_name
            .or(sender_id)
            .unwrap_or_else(|| "unknown".to_string());
        lines.push(format!("{}: {}", who, content_text.unwrap_or_default()));
    }
    Ok(lines.join("\n"))
}

fn row_to_message(row: &Row) -> rusqlite::Result<Message> {
    let raw_json: String = row.get("raw_json")?;
    let content_type: String = row.get("content_type")?;
    let direction: String = row.get("direction")?;
    Ok(Message {
        message_id: row.get("message_id")?,
        internal_id: row.get("internal_id")?,
        session_key: row.get("session_key")?,
        session_id: row.get("session_id")?,
        direction: parse_direction(&direction),
        sender_id: row.get("sender_id")?,
        sender_name: row.get("sender_name")?,
        recipient_id: row.get("recipient_id")?,
        recipient_name: row.get("recipient_name")?,
        channel: row.get("channel")?,
        device_id: row.get("device_id")?,
        content_type: parse_content_type(&content_type),
        content_text: row.get("content_text")?,
        raw_json: serde_json::from_str(&raw_json).unwrap_or(serde_json::Value::Null),
        fingerprint: row.get("fingerprint")?,
        reply_to_id: row.get("reply_to_id")?,
        thread_id: row.get("thread_id")?,
        timestamp: row.get("timestamp")?,
        edited_at: row.get("edited_at")?,
        deleted_at: row.get("deleted_at")?,
        ingested_at: row.get("ingested_at")?,
    })
}

fn direction_str(direction: Direction) -> &'static str {
    match direction {
        Direction::Inbound => "inbound",
        Direction::Outbound => "outbound",
    }
}

fn parse_direction(s: &str) -> Direction {
    match s {
        "outbound" => Direction::Outbound,
        _ => Direction::Inbound,
    }
}

fn content_type_str(content_type: ContentType) -> &'static str {
    content_type.as_str()
}

fn parse_content_type(s: &str) -> ContentType {
    match s {
        "image" => ContentType::Image,
        "video" => ContentType::Video,
        "audio" => ContentType::Audio,
        "document" => ContentType::Document,
        "sticker" => ContentType::Sticker,
        "location" => ContentType::Location,
        _ => ContentType::Text,
    }
}
