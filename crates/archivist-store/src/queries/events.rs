use rusqlite::{params, Connection, Row};

use archivist_types::{Event, EventType, ThinkingBlock, UsageStats};

use crate::records::{EventFilter, EventSessionSummary, SessionStats};
use crate::Result;

pub fn exists_by_id(conn: &Connection, event_id: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM events WHERE event_id = ?1",
        [event_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Raw insert. Propagates `rusqlite::Error` (including FK-constraint
/// failures) so the batch orchestrator in `Store` can classify them.
pub fn insert_row(conn: &Connection, event: &Event) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO events (
            event_id, parent_event_id, session_key, session_id, event_type,
            event_subtype, timestamp, ingested_at, raw_json, role, tool_name,
            model_provider, model_id, is_error, size_bytes
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        "#,
        params![
            event.event_id,
            event.parent_event_id,
            event.session_key,
            event.session_id,
            event.event_type.as_str(),
            event.event_subtype,
            event.timestamp,
            event.ingested_at,
            event.raw_json.to_string(),
            event.role,
            event.tool_name,
            event.model_provider,
            event.model_id,
            event.is_error,
            event.size_bytes,
        ],
    )?;
    Ok(())
}

pub fn insert_thinking_block(conn: &Connection, block: &ThinkingBlock) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO thinking_blocks (event_id, content, signature, size_bytes, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            block.event_id,
            block.content,
            block.signature,
            block.size_bytes,
            block.created_at,
        ],
    )?;
    Ok(())
}

pub fn insert_usage_stats(conn: &Connection, usage: &UsageStats) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO usage_stats (
            event_id, input_tokens, output_tokens, cache_read_tokens,
            cache_write_tokens, total_tokens, input_cost, output_cost,
            cache_read_cost, cache_write_cost, total_cost, model_provider,
            model_id, timestamp
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
        params![
            usage.event_id,
            usage.input_tokens,
            usage.output_tokens,
            usage.cache_read_tokens,
            usage.cache_write_tokens,
            usage.total_tokens,
            usage.input_cost,
            usage.output_cost,
            usage.cache_read_cost,
            usage.cache_write_cost,
            usage.total_cost,
            usage.model_provider,
            usage.model_id,
            usage.timestamp,
        ],
    )?;
    Ok(())
}

pub fn backfill_session_id(conn: &Connection, event_id: &str, session_id: &str) -> Result<()> {
    conn.execute(
        "UPDATE events SET session_id = ?1 WHERE event_id = ?2 AND session_id IS NULL",
        params![session_id, event_id],
    )?;
    Ok(())
}

pub fn select_session_events(
    conn: &Connection,
    session_id: &str,
    filter: &EventFilter,
) -> Result<Vec<Event>> {
    let mut clauses = vec!["session_id = ?".to_string()];
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(session_id.to_string())];

    if !filter.include_thinking {
        clauses.push("event_type != 'thinking_block'".to_string());
    }
    if !filter.include_usage {
        clauses.push("event_type != 'usage_stats'".to_string());
    }
    if let Some(start) = filter.start_time {
        clauses.push("timestamp >= ?".to_string());
        args.push(Box::new(start));
    }
    if let Some(end) = filter.end_time {
        clauses.push("timestamp <= ?".to_string());
        args.push(Box::new(end));
    }
    if let Some(types) = &filter.types {
        let placeholders = types.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        clauses.push(format!("event_type IN ({})", placeholders));
        for t in types {
            args.push(Box::new(t.clone()));
        }
    }

    let sql = format!(
        "SELECT * FROM events WHERE {} ORDER BY timestamp ASC",
        clauses.join(" AND ")
    );

    let mut stmt = conn.prepare(&sql)?;
    let params_ref: Vec<&dyn rusqlite::ToSql> = args.iter().map(|b| b.as_ref()).collect();
    let rows = stmt
        .query_map(params_ref.as_slice(), row_to_event)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn session_stats(conn: &Connection, session_id: &str) -> Result<SessionStats> {
    let mut stats = conn.query_row(
        r#"
        SELECT
            COUNT(*),
            SUM(CASE WHEN event_type = 'message' THEN 1 ELSE 0 END),
            SUM(CASE WHEN event_type = 'tool_call' THEN 1 ELSE 0 END),
            SUM(CASE WHEN is_error THEN 1 ELSE 0 END),
            MIN(timestamp),
            MAX(timestamp),
            SUM(size_bytes)
        FROM events WHERE session_id = ?1
        "#,
        [session_id],
        |row| {
            Ok(SessionStats {
                total_events: row.get(0)?,
                message_count: row.get::<_, Option<i64>>(1)?.unwrap_or(0),
                tool_call_count: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                error_count: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
                start_time: row.get(4)?,
                end_time: row.get(5)?,
                duration_seconds: None,
                total_size_bytes: row.get::<_, Option<i64>>(6)?.unwrap_or(0),
                total_tokens: 0,
                total_cost: 0.0,
            })
        },
    )?;

    if let (Some(start), Some(end)) = (stats.start_time, stats.end_time) {
        stats.duration_seconds = Some((end - start) / 1000);
    }

    let (total_tokens, total_cost): (Option<i64>, Option<f64>) = conn.query_row(
        r#"
        SELECT SUM(u.total_tokens), SUM(u.total_cost)
        FROM usage_stats u JOIN events e ON e.event_id = u.event_id
        WHERE e.session_id = ?1
        "#,
        [session_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    stats.total_tokens = total_tokens.unwrap_or(0);
    stats.total_cost = total_cost.unwrap_or(0.0);

    Ok(stats)
}

/// `list_sessions` as defined by the Query Surface (spec §4.6): grouped
/// directly off the `events` table rather than the (possibly not-yet-upserted)
/// `sessions` table, so a session is listable the moment its events land.
pub fn list_event_sessions(conn: &Connection) -> Result<Vec<EventSessionSummary>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT session_id, session_key, COUNT(*), MIN(timestamp), MAX(timestamp)
        FROM events
        WHERE session_id IS NOT NULL
        GROUP BY session_id, session_key
        ORDER BY MAX(timestamp) DESC
        "#,
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(EventSessionSummary {
                session_id: row.get(0)?,
                session_key: row.get(1)?,
                event_count: row.get(2)?,
                start_time: row.get(3)?,
                end_time: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Reconstructs a JSONL stream for `export_session_jsonl` (spec §4.1). Omits
/// synthetic events (already embedded in their parent `message`); re-emits
/// `tool_result` events under `type = "message"`.
pub fn export_session_jsonl(conn: &Connection, session_id: &str) -> Result<String> {
    let mut stmt = conn.prepare(
        r#"
        SELECT event_id, parent_event_id, event_type, timestamp, raw_json
        FROM events
        WHERE session_id = ?1
        ORDER BY timestamp ASC
        "#,
    )?;
    let mut rows = stmt.query([session_id])?;

    let mut lines = Vec::new();
    while let Some(row) = rows.next()? {
        let event_type: String = row.get(2)?;
        let kind = EventType::from_str(&event_type);
        if matches!(
            kind,
            Some(EventType::ToolCall) | Some(EventType::ThinkingBlock) | Some(EventType::UsageStats)
        ) {
            continue;
        }

        let event_id: String = row.get(0)?;
        let parent_event_id: Option<String> = row.get(1)?;
        let timestamp: i64 = row.get(3)?;
        let raw_json: String = row.get(4)?;
        let mut body: serde_json::Value =
            serde_json::from_str(&raw_json).unwrap_or(serde_json::Value::Null);

        if let Some(obj) = body.as_object_mut() {
            obj.insert("id".to_string(), serde_json::Value::String(event_id));
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::Number(timestamp.into()),
            );
            if let Some(parent) = parent_event_id {
                obj.insert("parentId".to_string(), serde_json::Value::String(parent));
            }
            if matches!(kind, Some(EventType::ToolResult)) {
                obj.insert(
                    "type".to_string(),
                    serde_json::Value::String("message".to_string()),
                );
            }
        }

        lines.push(body.to_string());
    }

    Ok(lines.join("\n"))
}

fn row_to_event(row: &Row) -> rusqlite::Result<Event> {
    let raw_json: String = row.get("raw_json")?;
    let event_type: String = row.get("event_type")?;
    Ok(Event {
        event_id: row.get("event_id")?,
        parent_event_id: row.get("parent_event_id")?,
        session_key: row.get("session_key")?,
        session_id: row.get("session_id")?,
        event_type: EventType::from_str(&event_type).unwrap_or(EventType::Custom),
        event_subtype: row.get("event_subtype")?,
        timestamp: row.get("timestamp")?,
        ingested_at: row.get("ingested_at")?,
        raw_json: serde_json::from_str(&raw_json).unwrap_or(serde_json::Value::Null),
        role: row.get("role")?,
        tool_name: row.get("tool_name")?,
        model_provider: row.get("model_provider")?,
        model_id: row.get("model_id")?,
        is_error: row.get("is_error")?,
        size_bytes: row.get("size_bytes")?,
    })
}
