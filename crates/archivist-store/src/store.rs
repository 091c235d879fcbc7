use std::cell::RefCell;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::Connection;

use archivist_types::{Event, EventType, Message, Session, ThinkingBlock, UsageStats};

use crate::error::Error;
use crate::queries;
use crate::records::{
    EventBatchResult, EventFilter, EventSessionSummary, MessageBatchResult, MessageFilter, SessionFilter,
    SessionStats,
};
use crate::schema;
use crate::Result;

/// Single embedded on-disk store (spec §4.1). Wraps one `rusqlite::Connection`
/// in a `RefCell` so every operation takes `&self` — mutations beyond a
/// single row open an explicit transaction internally rather than requiring
/// callers to manage one.
pub struct Store {
    conn: RefCell<Connection>,
}

impl Store {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: RefCell::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: RefCell::new(conn),
        })
    }

    // ---- Messages ---------------------------------------------------

    /// Returns `None` when a duplicate is detected under the three-stage
    /// predicate (spec §4.2); otherwise inserts and returns the row id.
    pub fn insert_message(&self, message: &Message, skip_if_exists: bool) -> Result<Option<i64>> {
        let conn = self.conn.borrow();
        if skip_if_exists && message_is_duplicate(&conn, message)? {
            return Ok(None);
        }
        queries::messages::insert_row(&conn, message)?;
        Ok(Some(conn.last_insert_rowid()))
    }

    /// Single transaction; individual records failing the duplicate
    /// predicate count as `skipped`, never surfaced as an error.
    pub fn insert_messages_batch(&self, messages: &[Message]) -> Result<MessageBatchResult> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        let mut result = MessageBatchResult::default();

        for message in messages {
            if message_is_duplicate(&tx, message)? {
                result.skipped += 1;
                continue;
            }
            queries::messages::insert_row(&tx, message)?;
            result.inserted += 1;
        }

        tx.commit()?;
        Ok(result)
    }

    pub fn insert_attachment(&self, attachment: &archivist_types::Attachment) -> Result<()> {
        let conn = self.conn.borrow();
        queries::messages::insert_attachment(&conn, attachment)
    }

    /// Upsert semantics: re-adding after removal clears `removed_at`.
    pub fn add_reaction(
        &self,
        message_id: &str,
        emoji: &str,
        user_id: &str,
        user_name: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn.borrow();
        queries::messages::add_reaction(&conn, message_id, emoji, user_id, user_name, now_millis())
    }

    /// Sets `removed_at` only if a currently active reaction exists.
    pub fn remove_reaction(&self, message_id: &str, emoji: &str, user_id: &str) -> Result<bool> {
        let conn = self.conn.borrow();
        queries::messages::remove_reaction(&conn, message_id, emoji, user_id, now_millis())
    }

    /// Atomically appends an Edit row with the previous content and rewrites
    /// the live Message's content + edited_at. Silent no-op if absent.
    pub fn update_message(&self, message_id: &str, new_content: &str, edited_at: i64) -> Result<bool> {
        let conn = self.conn.borrow();
        queries::messages::update_content(&conn, message_id, new_content, edited_at)
    }

    pub fn soft_delete_message(&self, message_id: &str, when: i64) -> Result<bool> {
        let conn = self.conn.borrow();
        queries::messages::soft_delete(&conn, message_id, when)
    }

    pub fn query_messages(&self, filter: &MessageFilter) -> Result<Vec<Message>> {
        let conn = self.conn.borrow();
        queries::messages::select_filtered(&conn, filter)
    }

    pub fn search(&self, query: &str, limit: i64) -> Result<Vec<Message>> {
        let conn = self.conn.borrow();
        queries::messages::search(&conn, query, limit)
    }

    pub fn conversation_context(&self, start: i64, end: i64, session_key: &str) -> Result<String> {
        let conn = self.conn.borrow();
        queries::messages::conversation_context(&conn, start, end, session_key)
    }

    // ---- Events -------------------------------------------------------

    /// On `event_type = thinking_block`/`usage_stats` the satellite row is
    /// written alongside the Event row (spec §4.1).
    pub fn insert_event(
        &self,
        event: &Event,
        session_key: &str,
        skip_if_exists: bool,
        suspend_fk: bool,
    ) -> Result<Option<i64>> {
        let conn = self.conn.borrow();
        if suspend_fk {
            conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
        }

        let outcome = insert_one_event(&conn, event, session_key, skip_if_exists);

        if suspend_fk {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        }

        outcome
    }

    /// Single transaction. If `session_id` is absent it is taken from the
    /// first `session` event in the batch; back-filled onto any event whose
    /// parser left it null. Under `suspend_fk`, foreign-key enforcement is
    /// lifted for the duration of the batch (spec §4.5/§5).
    pub fn insert_events_batch(
        &self,
        events: &[Event],
        session_key: &str,
        session_id: Option<&str>,
        suspend_fk: bool,
    ) -> Result<EventBatchResult> {
        let mut conn = self.conn.borrow_mut();
        if suspend_fk {
            conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
        }

        let resolved_session_id = session_id.map(|s| s.to_string()).or_else(|| {
            events
                .iter()
                .find(|e| e.event_type == EventType::Session)
                .map(|e| e.event_id.clone())
        });

        let mut result = EventBatchResult::default();
        let batch_outcome = (|| -> Result<()> {
            let tx = conn.transaction()?;
            for event in events {
                let mut event = event.clone();
                event.session_key = session_key.to_string();
                if event.session_id.is_none() {
                    event.session_id = resolved_session_id.clone();
                }

                if queries::events::exists_by_id(&tx, &event.event_id)? {
                    result.skipped += 1;
                    continue;
                }

                match queries::events::insert_row(&tx, &event) {
                    Ok(()) => {
                        result.inserted += 1;
                        write_satellite(&tx, &event)?;
                    }
                    Err(Error::Database(rusqlite::Error::SqliteFailure(ffi_err, _)))
                        if ffi_err.code == rusqlite::ErrorCode::ConstraintViolation =>
                    {
                        result.errors += 1;
                    }
                    Err(err) => return Err(err),
                }
            }
            tx.commit()?;
            Ok(())
        })();

        if suspend_fk {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        }

        batch_outcome?;
        Ok(result)
    }

    pub fn session_events(&self, session_id: &str, filter: &EventFilter) -> Result<Vec<Event>> {
        let conn = self.conn.borrow();
        queries::events::select_session_events(&conn, session_id, filter)
    }

    pub fn session_stats(&self, session_id: &str) -> Result<SessionStats> {
        let conn = self.conn.borrow();
        queries::events::session_stats(&conn, session_id)
    }

    pub fn export_session_jsonl(&self, session_id: &str) -> Result<String> {
        let conn = self.conn.borrow();
        queries::events::export_session_jsonl(&conn, session_id)
    }

    // ---- Sessions -------------------------------------------------------

    pub fn upsert_session(&self, session: &Session) -> Result<bool> {
        let conn = self.conn.borrow();
        queries::sessions::upsert(&conn, session)
    }

    pub fn get_session(&self, id: &str) -> Result<Option<Session>> {
        let conn = self.conn.borrow();
        queries::sessions::get_by_id(&conn, id)
    }

    pub fn query_sessions(&self, filter: &SessionFilter) -> Result<Vec<Session>> {
        let conn = self.conn.borrow();
        queries::sessions::select_filtered(&conn, filter)
    }

    /// Sessions grouped directly off the `events` table (spec §4.6
    /// `list_sessions`), independent of whether the `sessions` row exists.
    pub fn list_event_sessions(&self) -> Result<Vec<EventSessionSummary>> {
        let conn = self.conn.borrow();
        queries::events::list_event_sessions(&conn)
    }

    pub fn search_sessions(&self, query: &str, limit: i64) -> Result<Vec<Session>> {
        let conn = self.conn.borrow();
        queries::sessions::search(&conn, query, limit)
    }

    /// Maintenance operation implementing invariant I6: Session counts are
    /// never trusted as source of truth until explicitly refreshed.
    pub fn refresh_session_counts(&self, session_id: Option<&str>) -> Result<usize> {
        let conn = self.conn.borrow();
        queries::sessions::refresh_counts(&conn, session_id)
    }

    // ---- ScannerState / maintenance ------------------------------------

    /// Reads (`value = None`) or writes a ScannerState entry, returning the
    /// previous value.
    pub fn checkpoint(&self, key: &str, value: Option<&str>) -> Result<Option<String>> {
        let conn = self.conn.borrow();
        match value {
            Some(v) => queries::scanner_state::set(&conn, key, v, now_millis()),
            None => queries::scanner_state::get(&conn, key),
        }
    }

    pub fn vacuum(&self) -> Result<()> {
        let conn = self.conn.borrow();
        conn.execute("VACUUM", [])?;
        println!("store vacuumed");
        Ok(())
    }
}

fn insert_one_event(
    conn: &Connection,
    event: &Event,
    session_key: &str,
    skip_if_exists: bool,
) -> Result<Option<i64>> {
    let mut event = event.clone();
    event.session_key = session_key.to_string();

    if skip_if_exists && queries::events::exists_by_id(conn, &event.event_id)? {
        return Ok(None);
    }

    queries::events::insert_row(conn, &event)?;
    write_satellite(conn, &event)?;
    Ok(Some(conn.last_insert_rowid()))
}

fn write_satellite(conn: &Connection, event: &Event) -> Result<()> {
    match event.event_type {
        EventType::ThinkingBlock => {
            queries::events::insert_thinking_block(conn, &thinking_block_from_event(event))
        }
        EventType::UsageStats => {
            queries::events::insert_usage_stats(conn, &usage_stats_from_event(event))
        }
        _ => Ok(()),
    }
}

/// Extracts a ThinkingBlock satellite from a synthetic `thinking_block`
/// Event's verbatim JSON payload (spec §3, §4.3 fan-out).
fn thinking_block_from_event(event: &Event) -> ThinkingBlock {
    let content = event
        .raw_json
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let signature = event
        .raw_json
        .get("signature")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    ThinkingBlock {
        event_id: event.event_id.clone(),
        content,
        signature,
        size_bytes: event.size_bytes,
        created_at: event.ingested_at,
    }
}

/// Extracts a UsageStats satellite from a synthetic `usage_stats` Event's
/// verbatim JSON payload.
fn usage_stats_from_event(event: &Event) -> UsageStats {
    let v = &event.raw_json;
    let field_i64 = |key: &str| v.get(key).and_then(|x| x.as_i64()).unwrap_or(0);
    let cost = v.get("cost").cloned().unwrap_or(serde_json::Value::Null);
    let cost_f64 = |key: &str| cost.get(key).and_then(|x| x.as_f64()).unwrap_or(0.0);

    UsageStats {
        event_id: event.event_id.clone(),
        input_tokens: field_i64("input_tokens"),
        output_tokens: field_i64("output_tokens"),
        cache_read_tokens: field_i64("cache_read_tokens"),
        cache_write_tokens: field_i64("cache_write_tokens"),
        total_tokens: field_i64("total_tokens"),
        input_cost: cost_f64("input"),
        output_cost: cost_f64("output"),
        cache_read_cost: cost_f64("cache_read"),
        cache_write_cost: cost_f64("cache_write"),
        total_cost: cost_f64("total"),
        model_provider: event.model_provider.clone(),
        model_id: event.model_id.clone(),
        timestamp: event.timestamp,
    }
}

/// The three-stage duplicate predicate (spec §4.2), short-circuiting from
/// cheapest to most expensive.
fn message_is_duplicate(conn: &Connection, message: &Message) -> Result<bool> {
    if queries::messages::exists_by_id(conn, &message.message_id)? {
        return Ok(true);
    }
    if queries::messages::exists_by_fingerprint(conn, &message.fingerprint)? {
        return Ok(true);
    }
    if let (Some(sender_id), Some(content_text)) = (&message.sender_id, &message.content_text) {
        if queries::messages::exists_near_duplicate(conn, sender_id, content_text, message.timestamp)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
