use archivist_store::{EventFilter, Store};
use archivist_types::timestamp::format_millis_rfc3339;

use crate::detail::session_detail;
use crate::domain::SessionDetail;
use crate::Error;
use crate::Result;

/// Output formats for `export_session` (spec §4.6: "JSON, Markdown, plain
/// text, CSV, JSONL"). `Jsonl` is the machine-consumption format of spec
/// §4.1's `export_session_jsonl`; the other four are operator-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Markdown,
    Text,
    Csv,
    Jsonl,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Text => "text",
            ExportFormat::Csv => "csv",
            ExportFormat::Jsonl => "jsonl",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "json" => ExportFormat::Json,
            "markdown" | "md" => ExportFormat::Markdown,
            "text" | "txt" => ExportFormat::Text,
            "csv" => ExportFormat::Csv,
            "jsonl" => ExportFormat::Jsonl,
            _ => return None,
        })
    }
}

/// Renders `session_id` in `format`. `Jsonl` reconstructs the original
/// event-log lines via the Store directly (spec §4.1 `export_session_jsonl`,
/// §4.6 "reconstruct"); every other format is built here from the same
/// `session_detail` the rest of the Query Surface serves, so all exports see
/// one consistent view of a session.
pub fn export_session(store: &Store, session_id: &str, format: ExportFormat) -> Result<String> {
    if format == ExportFormat::Jsonl {
        return Ok(store.export_session_jsonl(session_id)?);
    }

    let detail = session_detail(store, session_id, &EventFilter { include_thinking: true, include_usage: true, ..Default::default() })?;
    if detail.session.is_none() && detail.events.is_empty() {
        return Err(Error::SessionNotFound(session_id.to_string()));
    }

    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(&detail)?),
        ExportFormat::Markdown => Ok(render_markdown(&detail)),
        ExportFormat::Text => Ok(render_text(&detail)),
        ExportFormat::Csv => render_csv(&detail),
        ExportFormat::Jsonl => unreachable!(),
    }
}

fn render_markdown(detail: &SessionDetail) -> String {
    let mut out = String::new();
    let title = detail
        .session
        .as_ref()
        .and_then(|s| s.title.clone())
        .unwrap_or_else(|| "(untitled session)".to_string());
    out.push_str(&format!("# {}\n\n", title));
    if let Some(summary) = detail.session.as_ref().and_then(|s| s.summary.as_deref()) {
        out.push_str(summary);
        out.push_str("\n\n");
    }
    out.push_str(&format!(
        "- Events: {}\n- Tool calls: {}\n- Errors: {}\n",
        detail.stats.total_events, detail.stats.tool_call_count, detail.stats.error_count
    ));
    if let Some(tokens) = Some(detail.stats.total_tokens).filter(|t| *t > 0) {
        out.push_str(&format!("- Total tokens: {}\n", tokens));
    }
    out.push_str("\n---\n\n");

    for event in &detail.events {
        let when = format_millis_rfc3339(event.timestamp);
        out.push_str(&format!("### {} — {}\n\n", when, event.event_type.as_str()));
        if let Some(role) = &event.role {
            out.push_str(&format!("*role: {}*\n\n", role));
        }
        if let Some(text) = extract_markdown_body(event) {
            out.push_str(&text);
            out.push_str("\n\n");
        }
    }
    out
}

fn render_text(detail: &SessionDetail) -> String {
    let mut out = String::new();
    for event in &detail.events {
        let when = format_millis_rfc3339(event.timestamp);
        let role = event.role.clone().unwrap_or_else(|| event.event_type.as_str().to_string());
        let body = extract_markdown_body(event).unwrap_or_default();
        out.push_str(&format!("[{}] {}: {}\n", when, role, body.replace('\n', " ")));
    }
    out
}

fn render_csv(detail: &SessionDetail) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "event_id",
        "timestamp",
        "event_type",
        "role",
        "tool_name",
        "is_error",
        "size_bytes",
    ])?;
    for event in &detail.events {
        writer.write_record([
            event.event_id.as_str(),
            &event.timestamp.to_string(),
            event.event_type.as_str(),
            event.role.as_deref().unwrap_or(""),
            event.tool_name.as_deref().unwrap_or(""),
            if event.is_error { "true" } else { "false" },
            &event.size_bytes.to_string(),
        ])?;
    }
    let bytes = writer.into_inner().map_err(|e| Error::Csv(csv::Error::from(e.into_error())))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Best-effort plain-text body for one event, used by the Markdown and text
/// renderers: `message`/`tool_result` text content, `tool_call` name+args,
/// `thinking_block` content.
fn extract_markdown_body(event: &archivist_types::Event) -> Option<String> {
    let raw = &event.raw_json;
    if let Some(content) = raw.get("message").and_then(|m| m.get("content")).or_else(|| raw.get("content")) {
        if let Some(blocks) = content.as_array() {
            let parts: Vec<String> = blocks
                .iter()
                .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
                .map(|s| s.to_string())
                .collect();
            if !parts.is_empty() {
                return Some(parts.join("\n"));
            }
        }
    }
    if event.event_type == archivist_types::EventType::ToolCall {
        return Some(format!("{}({})", event.tool_name.as_deref().unwrap_or("?"), raw.get("arguments").cloned().unwrap_or_default()));
    }
    if event.event_type == archivist_types::EventType::ThinkingBlock {
        return raw.get("content").and_then(|v| v.as_str()).map(|s| s.to_string());
    }
    None
}
