use archivist_types::{identity, ContentType, Direction, Event, EventType, Message};

/// Channel tag used for Messages derived from the internal agent event-log,
/// as opposed to an imported third-party export (spec §3 "Message": `channel`
/// examples list `telegram, whatsapp, discord, openclaw` — the last one is
/// this system's own chat surface).
pub const OPENCLAW_CHANNEL: &str = "openclaw";

/// Projects a primary `message`/`tool_result` Event onto the generic Message
/// record, so the same conversational surface (search, context windows,
/// reactions) that serves imported chat exports also serves the agent's own
/// sessions. Synthetic satellite events (`tool_call`, `thinking_block`,
/// `usage_stats`) have no chat-turn of their own and are skipped.
pub fn event_to_message(event: &Event, session_key: &str) -> Option<Message> {
    if event.event_type.is_synthetic() || event.event_type == EventType::Session {
        return None;
    }
    if !matches!(event.event_type, EventType::Message | EventType::ToolResult) {
        return None;
    }

    let role = event.role.clone().unwrap_or_default();
    let direction = if role == "user" {
        Direction::Inbound
    } else {
        Direction::Outbound
    };

    let content_text = extract_text(event);
    let sender_id = if role.is_empty() { None } else { Some(role.clone()) };
    let sender_name = match role.as_str() {
        "assistant" => event.model_id.clone().or(Some(role.clone())),
        "" => None,
        _ => Some(role.clone()),
    };

    let fingerprint = identity::message_fingerprint(
        sender_id.as_deref().unwrap_or("unknown"),
        event.timestamp,
        content_text.as_deref().unwrap_or(""),
    );

    Some(Message {
        message_id: format!("openclaw:{}", event.event_id),
        internal_id: Some(event.event_id.clone()),
        session_key: session_key.to_string(),
        session_id: event.session_id.clone(),
        direction,
        sender_id,
        sender_name,
        recipient_id: None,
        recipient_name: None,
        channel: OPENCLAW_CHANNEL.to_string(),
        device_id: None,
        content_type: ContentType::Text,
        content_text,
        raw_json: event.raw_json.clone(),
        fingerprint,
        reply_to_id: event.parent_event_id.clone(),
        thread_id: None,
        timestamp: event.timestamp,
        edited_at: None,
        deleted_at: None,
        ingested_at: event.ingested_at,
    })
}

/// Concatenates `text` content blocks under `message.content`/`content`
/// (the parser leaves the original shape intact in `raw_json`).
fn extract_text(event: &Event) -> Option<String> {
    let content = event
        .raw_json
        .get("message")
        .and_then(|m| m.get("content"))
        .or_else(|| event.raw_json.get("content"))?;

    let blocks = content.as_array()?;
    let mut parts = Vec::new();
    for block in blocks {
        if let Some(text) = block.get("text").and_then(|t| t.as_str()) {
            parts.push(text.to_string());
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_event(role: &str, raw_json: serde_json::Value) -> Event {
        Event {
            event_id: "E1".to_string(),
            parent_event_id: None,
            session_key: "agent:main:main".to_string(),
            session_id: Some("S1".to_string()),
            event_type: EventType::Message,
            event_subtype: None,
            timestamp: 1000,
            ingested_at: 2000,
            raw_json,
            role: Some(role.to_string()),
            tool_name: None,
            model_provider: None,
            model_id: Some("claude".to_string()),
            is_error: false,
            size_bytes: 10,
        }
    }

    #[test]
    fn user_message_is_inbound() {
        let event = base_event(
            "user",
            json!({"message": {"content": [{"type": "text", "text": "hi"}]}}),
        );
        let message = event_to_message(&event, "agent:main:main").unwrap();
        assert_eq!(message.direction, Direction::Inbound);
        assert_eq!(message.content_text.as_deref(), Some("hi"));
        assert_eq!(message.channel, "openclaw");
    }

    #[test]
    fn assistant_message_is_outbound_and_named_by_model() {
        let event = base_event(
            "assistant",
            json!({"message": {"content": [{"type": "text", "text": "hello"}]}}),
        );
        let message = event_to_message(&event, "agent:main:main").unwrap();
        assert_eq!(message.direction, Direction::Outbound);
        assert_eq!(message.sender_name.as_deref(), Some("claude"));
    }

    #[test]
    fn synthetic_events_are_skipped() {
        let mut event = base_event("assistant", json!({}));
        event.event_type = EventType::ToolCall;
        assert!(event_to_message(&event, "agent:main:main").is_none());
    }

    #[test]
    fn session_events_are_skipped() {
        let mut event = base_event("", json!({}));
        event.event_type = EventType::Session;
        assert!(event_to_message(&event, "agent:main:main").is_none());
    }
}
