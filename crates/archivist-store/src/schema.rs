use rusqlite::Connection;

use crate::Result;

/// Schema version. Migrations are purely additive (spec invariant: no
/// destructive migrations) — bump this and append a migration to
/// `MIGRATIONS` rather than editing an earlier one in place.
pub const SCHEMA_VERSION: i32 = 1;

/// One additive migration: a batch of `CREATE TABLE IF NOT EXISTS` /
/// `CREATE INDEX IF NOT EXISTS` / trigger statements applied at the version
/// it is indexed under. Re-running a migration against an up-to-date schema
/// is a no-op because every statement is idempotent.
type Migration = &'static str;

const MIGRATIONS: &[Migration] = &[V1_BASE_SCHEMA];

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA foreign_keys = ON;
        "#,
    )?;

    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    for (idx, migration) in MIGRATIONS.iter().enumerate() {
        let version = (idx + 1) as i32;
        if version > current_version {
            conn.execute_batch(migration)?;
        }
    }

    if current_version < SCHEMA_VERSION {
        conn.execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;
    }

    Ok(())
}

const V1_BASE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    message_id      TEXT PRIMARY KEY,
    internal_id     TEXT,
    session_key     TEXT NOT NULL,
    session_id      TEXT,
    direction       TEXT NOT NULL,
    sender_id       TEXT,
    sender_name     TEXT,
    recipient_id    TEXT,
    recipient_name  TEXT,
    channel         TEXT NOT NULL,
    device_id       TEXT,
    content_type    TEXT NOT NULL,
    content_text    TEXT,
    raw_json        TEXT NOT NULL,
    fingerprint     TEXT NOT NULL,
    reply_to_id     TEXT,
    thread_id       TEXT,
    timestamp       INTEGER NOT NULL,
    edited_at       INTEGER,
    deleted_at      INTEGER,
    ingested_at     INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_fingerprint ON messages(fingerprint);
CREATE INDEX IF NOT EXISTS idx_messages_sender_ts ON messages(sender_id, timestamp);
CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_key);
CREATE INDEX IF NOT EXISTS idx_messages_timestamp ON messages(timestamp DESC);

CREATE TABLE IF NOT EXISTS attachments (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    message_id      TEXT NOT NULL REFERENCES messages(message_id),
    attachment_type TEXT NOT NULL,
    file_path       TEXT,
    url             TEXT,
    filename        TEXT,
    size_bytes      INTEGER,
    mime_type       TEXT,
    thumbnail_path  TEXT,
    metadata        TEXT,
    created_at      INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_attachments_message ON attachments(message_id);

CREATE TABLE IF NOT EXISTS reactions (
    message_id  TEXT NOT NULL REFERENCES messages(message_id),
    emoji       TEXT NOT NULL,
    user_id     TEXT NOT NULL,
    user_name   TEXT,
    added_at    INTEGER NOT NULL,
    removed_at  INTEGER,
    PRIMARY KEY (message_id, emoji, user_id)
);

CREATE TABLE IF NOT EXISTS edits (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    message_id       TEXT NOT NULL REFERENCES messages(message_id),
    previous_content TEXT,
    edited_at        INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_edits_message ON edits(message_id);

CREATE TABLE IF NOT EXISTS events (
    event_id        TEXT PRIMARY KEY,
    parent_event_id TEXT REFERENCES events(event_id),
    session_key     TEXT NOT NULL,
    session_id      TEXT,
    event_type      TEXT NOT NULL,
    event_subtype   TEXT,
    timestamp       INTEGER NOT NULL,
    ingested_at     INTEGER NOT NULL,
    raw_json        TEXT NOT NULL,
    role            TEXT,
    tool_name       TEXT,
    model_provider  TEXT,
    model_id        TEXT,
    is_error        INTEGER NOT NULL DEFAULT 0,
    size_bytes      INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_events_session ON events(session_id);
CREATE INDEX IF NOT EXISTS idx_events_parent ON events(parent_event_id);
CREATE INDEX IF NOT EXISTS idx_events_type ON events(event_type);
CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp);

CREATE TABLE IF NOT EXISTS thinking_blocks (
    event_id    TEXT PRIMARY KEY REFERENCES events(event_id),
    content     TEXT NOT NULL,
    signature   TEXT,
    size_bytes  INTEGER NOT NULL,
    created_at  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS usage_stats (
    event_id          TEXT PRIMARY KEY REFERENCES events(event_id),
    input_tokens      INTEGER NOT NULL DEFAULT 0,
    output_tokens     INTEGER NOT NULL DEFAULT 0,
    cache_read_tokens INTEGER NOT NULL DEFAULT 0,
    cache_write_tokens INTEGER NOT NULL DEFAULT 0,
    total_tokens      INTEGER NOT NULL DEFAULT 0,
    input_cost        REAL NOT NULL DEFAULT 0,
    output_cost       REAL NOT NULL DEFAULT 0,
    cache_read_cost   REAL NOT NULL DEFAULT 0,
    cache_write_cost  REAL NOT NULL DEFAULT 0,
    total_cost        REAL NOT NULL DEFAULT 0,
    model_provider    TEXT,
    model_id          TEXT,
    timestamp         INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    id                 TEXT PRIMARY KEY,
    session_key        TEXT NOT NULL,
    session_type       TEXT NOT NULL,
    parent_session_id  TEXT,
    label              TEXT,
    agent_id           TEXT,
    model              TEXT,
    started_at         INTEGER,
    ended_at           INTEGER,
    status             TEXT NOT NULL,
    title              TEXT,
    summary            TEXT,
    message_count      INTEGER NOT NULL DEFAULT 0,
    event_count        INTEGER NOT NULL DEFAULT 0,
    created_at         INTEGER NOT NULL,
    updated_at         INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_key ON sessions(session_key);
CREATE INDEX IF NOT EXISTS idx_sessions_started ON sessions(started_at DESC);

CREATE TABLE IF NOT EXISTS scanner_state (
    key         TEXT PRIMARY KEY,
    value       TEXT,
    updated_at  INTEGER NOT NULL
);

-- Full-text indexes (invariant I5: kept in lockstep with base rows via
-- triggers below, never populated or read directly by application code).
CREATE VIRTUAL TABLE IF NOT EXISTS messages_fts USING fts5(
    message_id UNINDEXED,
    content,
    tokenize = 'porter unicode61'
);

CREATE VIRTUAL TABLE IF NOT EXISTS sessions_fts USING fts5(
    session_id UNINDEXED,
    title,
    summary,
    tokenize = 'porter unicode61'
);

CREATE TRIGGER IF NOT EXISTS messages_fts_ai AFTER INSERT ON messages BEGIN
    INSERT INTO messages_fts(message_id, content) VALUES (new.message_id, coalesce(new.content_text, ''));
END;

CREATE TRIGGER IF NOT EXISTS messages_fts_au AFTER UPDATE ON messages BEGIN
    DELETE FROM messages_fts WHERE message_id = old.message_id;
    INSERT INTO messages_fts(message_id, content) VALUES (new.message_id, coalesce(new.content_text, ''));
END;

CREATE TRIGGER IF NOT EXISTS messages_fts_ad AFTER DELETE ON messages BEGIN
    DELETE FROM messages_fts WHERE message_id = old.message_id;
END;

CREATE TRIGGER IF NOT EXISTS sessions_fts_ai AFTER INSERT ON sessions BEGIN
    INSERT INTO sessions_fts(session_id, title, summary) VALUES (new.id, coalesce(new.title, ''), coalesce(new.summary, ''));
END;

CREATE TRIGGER IF NOT EXISTS sessions_fts_au AFTER UPDATE ON sessions BEGIN
    DELETE FROM sessions_fts WHERE session_id = old.id;
    INSERT INTO sessions_fts(session_id, title, summary) VALUES (new.id, coalesce(new.title, ''), coalesce(new.summary, ''));
END;

CREATE TRIGGER IF NOT EXISTS sessions_fts_ad AFTER DELETE ON sessions BEGIN
    DELETE FROM sessions_fts WHERE session_id = old.id;
END;
"#;
