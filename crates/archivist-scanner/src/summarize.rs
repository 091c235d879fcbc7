use archivist_parser::SessionMetadata;

/// Inputs available to a Summarizer when labeling a session (spec §4.5 step
/// 5: "call the Summarizer with session metadata and events").
pub struct SessionSummaryInput<'a> {
    pub session_id: &'a str,
    pub session_key: &'a str,
    pub metadata: &'a SessionMetadata,
}

/// External collaborator that turns session metadata into a human title and
/// summary. The core crate never performs network I/O itself (spec §5
/// Non-goals); `LocalFallbackSummarizer` is the deterministic strategy used
/// when no richer collaborator is wired in, and the only one this crate
/// ships.
pub trait Summarizer {
    fn summarize(&self, input: &SessionSummaryInput<'_>) -> Option<(String, String)>;
}

/// Deterministic, offline summary: no model call, just a label built from
/// the aggregated counts the parser already computed.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFallbackSummarizer;

impl Summarizer for LocalFallbackSummarizer {
    fn summarize(&self, input: &SessionSummaryInput<'_>) -> Option<(String, String)> {
        let meta = input.metadata;
        let title = format!("{} ({} events)", input.session_key, meta.event_count);
        let mut parts = vec![format!("{} events", meta.event_count)];
        if meta.tool_call_count > 0 {
            parts.push(format!("{} tool calls", meta.tool_call_count));
        }
        if meta.has_thinking {
            parts.push("thinking".to_string());
        }
        if meta.error_count > 0 {
            parts.push(format!("{} errors", meta.error_count));
        }
        let summary = format!("Session {}: {}.", input.session_id, parts.join(", "));
        Some((title, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_always_produces_a_label() {
        let meta = SessionMetadata {
            event_count: 4,
            tool_call_count: 1,
            has_thinking: true,
            error_count: 0,
            ..Default::default()
        };
        let input = SessionSummaryInput {
            session_id: "S1",
            session_key: "agent:main:main",
            metadata: &meta,
        };
        let (title, summary) = LocalFallbackSummarizer.summarize(&input).unwrap();
        assert!(title.contains("agent:main:main"));
        assert!(summary.contains("tool calls"));
    }
}
