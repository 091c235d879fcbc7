use archivist_store::{MessageFilter, Store};
use archivist_types::timestamp::parse_iso8601_millis;

use crate::error::Error;
use crate::output::{fmt_time, print_json};
use crate::Result;

/// `archivist list sessions` (spec §4.6 `list_sessions`).
pub fn run_sessions(store: &Store, limit: Option<usize>, json: bool) -> Result<()> {
    let mut entries = archivist_query::list_sessions(store)?;
    entries.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    if let Some(limit) = limit {
        entries.truncate(limit);
    }

    if json {
        print_json(&entries);
        return Ok(());
    }

    if entries.is_empty() {
        println!("no sessions archived yet");
        return Ok(());
    }
    for entry in &entries {
        let title = entry.title.as_deref().unwrap_or("(untitled)");
        let status = entry.status.as_deref().unwrap_or("-");
        println!(
            "{}  [{}]  {} events  {} — {}",
            entry.session_id, status, entry.event_count, title, fmt_time(entry.start_time)
        );
    }
    Ok(())
}

/// `archivist list messages` (spec §4.1 `query_messages`).
#[allow(clippy::too_many_arguments)]
pub fn run_messages(
    store: &Store,
    session_key: Option<String>,
    channel: Option<String>,
    sender: Option<String>,
    since: Option<String>,
    until: Option<String>,
    content_match: Option<String>,
    include_deleted: bool,
    limit: i64,
    offset: i64,
    json: bool,
) -> Result<()> {
    let start_time = since.map(|s| parse_timestamp_arg(&s)).transpose()?;
    let end_time = until.map(|s| parse_timestamp_arg(&s)).transpose()?;

    let filter = MessageFilter {
        session_key,
        channel,
        sender_id: sender,
        start_time,
        end_time,
        content_match,
        include_deleted,
        limit: Some(limit),
        offset: Some(offset),
    };
    let messages = store.query_messages(&filter)?;

    if json {
        print_json(&messages);
        return Ok(());
    }

    if messages.is_empty() {
        println!("no messages match that filter");
        return Ok(());
    }
    for message in &messages {
        let sender = message.sender_name.as_deref().unwrap_or("-");
        let text = message.content_text.as_deref().unwrap_or("");
        let deleted = if message.deleted_at.is_some() { " [deleted]" } else { "" };
        println!(
            "[{}] {} ({}) {}: {}{}",
            fmt_time(Some(message.timestamp)),
            sender,
            message.channel,
            message.message_id,
            text.replace('\n', " "),
            deleted,
        );
    }
    Ok(())
}

/// Accepts either a raw epoch-millis integer or an ISO-8601 timestamp for
/// `--since`/`--until`, matching the two timestamp shapes already used
/// elsewhere in this stack (stored columns are millis; source records are
/// ISO-8601).
fn parse_timestamp_arg(raw: &str) -> Result<i64> {
    if let Ok(millis) = raw.parse::<i64>() {
        return Ok(millis);
    }
    parse_iso8601_millis(raw).map_err(|_| Error::Usage(format!("invalid timestamp '{raw}' (expected epoch millis or ISO-8601)")))
}
