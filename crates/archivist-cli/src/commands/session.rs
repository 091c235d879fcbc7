use std::path::Path;

use archivist_query::{export_session, session_detail, ExportFormat};
use archivist_store::{EventFilter, Store};

use crate::error::Error;
use crate::output::{fmt_time, print_json};
use crate::Result;

/// `archivist session show` (spec §4.6 `session_detail`).
pub fn run_show(store: &Store, id: &str, include_thinking: bool, include_usage: bool, json: bool) -> Result<()> {
    let filter = EventFilter { include_thinking, include_usage, ..Default::default() };
    let detail = session_detail(store, id, &filter)?;

    if json {
        print_json(&detail);
        return Ok(());
    }

    match &detail.session {
        Some(session) => {
            println!("{}  [{}]", session.id, session.status.as_str());
            if let Some(title) = &session.title {
                println!("{}", title);
            }
            if let Some(summary) = &session.summary {
                println!("{}", summary);
            }
        }
        None => println!("{id}  (no session row upserted yet)"),
    }
    println!(
        "events: {}  tool calls: {}  errors: {}  tokens: {}  cost: {:.4}",
        detail.stats.total_events, detail.stats.tool_call_count, detail.stats.error_count, detail.stats.total_tokens, detail.stats.total_cost
    );
    println!("---");
    for event in &detail.events {
        let role = event.role.clone().unwrap_or_else(|| event.event_type.as_str().to_string());
        println!("[{}] {} {}", fmt_time(Some(event.timestamp)), event.event_type.as_str(), role);
    }
    Ok(())
}

/// `archivist session export` (spec §4.1 `export_session_jsonl`, §4.6
/// "Exports: JSON, Markdown, plain text, CSV, JSONL").
pub fn run_export(store: &Store, id: &str, format: &str, out: Option<&Path>) -> Result<()> {
    let format = ExportFormat::from_str(format)
        .ok_or_else(|| Error::Usage(format!("unknown --format '{format}' (expected json|markdown|text|csv|jsonl)")))?;
    let rendered = export_session(store, id, format)?;

    match out {
        Some(path) => std::fs::write(path, rendered)?,
        None => println!("{rendered}"),
    }
    Ok(())
}
