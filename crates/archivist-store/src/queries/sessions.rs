use rusqlite::{params, Connection, OptionalExtension, Row};

use archivist_types::{Session, SessionStatus, SessionType};

use crate::records::SessionFilter;
use crate::Result;

/// Insert-or-update keyed by session id (spec §4.1 `upsert_session`).
/// Returns `true` when a new row was inserted, `false` on update, mirroring
/// the teacher's `ON CONFLICT DO UPDATE` upsert idiom.
pub fn upsert(conn: &Connection, session: &Session) -> Result<bool> {
    let existed = conn
        .query_row(
            "SELECT 1 FROM sessions WHERE id = ?1",
            [&session.id],
            |_| Ok(()),
        )
        .optional()?
        .is_some();

    conn.execute(
        r#"
        INSERT INTO sessions (
            id, session_key, session_type, parent_session_id, label, agent_id,
            model, started_at, ended_at, status, title, summary, message_count,
            event_count, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
        ON CONFLICT(id) DO UPDATE SET
            session_key = ?2,
            session_type = ?3,
            parent_session_id = COALESCE(?4, parent_session_id),
            label = COALESCE(?5, label),
            agent_id = COALESCE(?6, agent_id),
            model = COALESCE(?7, model),
            started_at = COALESCE(?8, started_at),
            ended_at = COALESCE(?9, ended_at),
            status = ?10,
            title = COALESCE(?11, title),
            summary = COALESCE(?12, summary),
            message_count = ?13,
            event_count = ?14,
            updated_at = ?16
        "#,
        params![
            session.id,
            session.session_key,
            session.session_type.as_str(),
            session.parent_session_id,
            session.label,
            session.agent_id,
            session.model,
            session.started_at,
            session.ended_at,
            session.status.as_str(),
            session.title,
            session.summary,
            session.message_count,
            session.event_count,
            session.created_at,
            session.updated_at,
        ],
    )?;

    Ok(!existed)
}

pub fn get_by_id(conn: &Connection, id: &str) -> Result<Option<Session>> {
    conn.query_row("SELECT * FROM sessions WHERE id = ?1", [id], row_to_session)
        .optional()
        .map_err(Into::into)
}

pub fn select_filtered(conn: &Connection, filter: &SessionFilter) -> Result<Vec<Session>> {
    let mut clauses = Vec::new();
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(session_type) = &filter.session_type {
        clauses.push("session_type = ?".to_string());
        args.push(Box::new(session_type.clone()));
    }
    if let Some(status) = &filter.status {
        clauses.push("status = ?".to_string());
        args.push(Box::new(status.clone()));
    }
    if let Some(agent_id) = &filter.agent_id {
        clauses.push("agent_id = ?".to_string());
        args.push(Box::new(agent_id.clone()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let limit = filter.limit.unwrap_or(200);
    let offset = filter.offset.unwrap_or(0);

    let sql = format!(
        "SELECT * FROM sessions {} ORDER BY started_at DESC LIMIT {} OFFSET {}",
        where_sql, limit, offset
    );

    let mut stmt = conn.prepare(&sql)?;
    let params_ref: Vec<&dyn rusqlite::ToSql> = args.iter().map(|b| b.as_ref()).collect();
    let rows = stmt
        .query_map(params_ref.as_slice(), row_to_session)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn search(conn: &Connection, query: &str, limit: i64) -> Result<Vec<Session>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT s.* FROM sessions s
        JOIN sessions_fts f ON f.session_id = s.id
        WHERE f.title MATCH ?1 OR f.summary MATCH ?1
        ORDER BY rank
        LIMIT ?2
        "#,
    )?;
    let rows = stmt
        .query_map(params![query, limit], row_to_session)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Recomputes `message_count`/`event_count` for one session (or all when
/// `session_id` is `None`) from the Event table (spec invariant I6).
pub fn refresh_counts(conn: &Connection, session_id: Option<&str>) -> Result<usize> {
    let sql = match session_id {
        Some(_) => {
            r#"
            UPDATE sessions SET
                event_count = (SELECT COUNT(*) FROM events e WHERE e.session_id = sessions.id),
                message_count = (
                    SELECT COUNT(*) FROM events e
                    WHERE e.session_id = sessions.id AND e.event_type = 'message'
                )
            WHERE id = ?1
            "#
        }
        None => {
            r#"
            UPDATE sessions SET
                event_count = (SELECT COUNT(*) FROM events e WHERE e.session_id = sessions.id),
                message_count = (
                    SELECT COUNT(*) FROM events e
                    WHERE e.session_id = sessions.id AND e.event_type = 'message'
                )
            "#
        }
    };

    let changed = match session_id {
        Some(id) => conn.execute(sql, [id])?,
        None => conn.execute(sql, [])?,
    };
    Ok(changed)
}

fn row_to_session(row: &Row) -> rusqlite::Result<Session> {
    let session_type: String = row.get("session_type")?;
    let status: String = row.get("status")?;
    Ok(Session {
        id: row.get("id")?,
        session_key: row.get("session_key")?,
        session_type: SessionType::from_str(&session_type).unwrap_or(SessionType::Main),
        parent_session_id: row.get("parent_session_id")?,
        label: row.get("label")?,
        agent_id: row.get("agent_id")?,
        model: row.get("model")?,
        started_at: row.get("started_at")?,
        ended_at: row.get("ended_at")?,
        status: SessionStatus::from_str(&status).unwrap_or(SessionStatus::Active),
        title: row.get("title")?,
        summary: row.get("summary")?,
        message_count: row.get("message_count")?,
        event_count: row.get("event_count")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
