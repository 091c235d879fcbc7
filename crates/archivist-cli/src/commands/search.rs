use archivist_store::Store;

use crate::output::{fmt_time, print_json};
use crate::Result;

/// `archivist search` (spec §4.1 `search`/`search_sessions`): ranked FTS
/// lookup over message content, or over session title+summary with
/// `--sessions`.
pub fn run(store: &Store, query: &str, limit: i64, sessions: bool, json: bool) -> Result<()> {
    if sessions {
        let results = store.search_sessions(query, limit)?;
        if json {
            print_json(&results);
            return Ok(());
        }
        if results.is_empty() {
            println!("no sessions match '{query}'");
            return Ok(());
        }
        for session in &results {
            println!("{}  {}", session.id, session.title.as_deref().unwrap_or("(untitled)"));
        }
        return Ok(());
    }

    let results = store.search(query, limit)?;
    if json {
        print_json(&results);
        return Ok(());
    }
    if results.is_empty() {
        println!("no messages match '{query}'");
        return Ok(());
    }
    for message in &results {
        let text = message.content_text.as_deref().unwrap_or("");
        println!("[{}] {}: {}", fmt_time(Some(message.timestamp)), message.message_id, text.replace('\n', " "));
    }
    Ok(())
}
