use archivist_store::{EventFilter, MessageFilter, Store};
use archivist_types::identity::{message_fingerprint, thinking_block_event_id, tool_call_event_id, usage_stats_event_id};
use archivist_types::{ContentType, Direction, Event, EventType, Message, Session, SessionStatus, SessionType};
use serde_json::json;

fn sample_message(id: &str, sender: &str, text: &str, ts: i64) -> Message {
    Message {
        message_id: id.to_string(),
        internal_id: None,
        session_key: "agent:main:main".to_string(),
        session_id: None,
        direction: Direction::Inbound,
        sender_id: Some(sender.to_string()),
        sender_name: Some(sender.to_string()),
        recipient_id: None,
        recipient_name: None,
        channel: "openclaw".to_string(),
        device_id: None,
        content_type: ContentType::Text,
        content_text: Some(text.to_string()),
        raw_json: json!({"text": text}),
        fingerprint: message_fingerprint(sender, ts, text),
        reply_to_id: None,
        thread_id: None,
        timestamp: ts,
        edited_at: None,
        deleted_at: None,
        ingested_at: ts,
    }
}

fn session_event(id: &str, ts: i64) -> Event {
    Event {
        event_id: id.to_string(),
        parent_event_id: None,
        session_key: "agent:main:main".to_string(),
        session_id: Some(id.to_string()),
        event_type: EventType::Session,
        event_subtype: None,
        timestamp: ts,
        ingested_at: ts,
        raw_json: json!({"type": "session", "id": id, "version": 3, "cwd": "/x"}),
        role: None,
        tool_name: None,
        model_provider: None,
        model_id: None,
        is_error: false,
        size_bytes: 32,
    }
}

#[test]
fn insert_and_query_message_round_trips() {
    let store = Store::open_in_memory().unwrap();
    let msg = sample_message("m1", "alice", "hello world", 1000);
    let id = store.insert_message(&msg, true).unwrap();
    assert!(id.is_some());

    let found = store
        .query_messages(&MessageFilter {
            session_key: Some("agent:main:main".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message_id, "m1");
}

#[test]
fn duplicate_by_exact_id_is_skipped() {
    let store = Store::open_in_memory().unwrap();
    let msg = sample_message("m1", "alice", "hello", 1000);
    assert!(store.insert_message(&msg, true).unwrap().is_some());
    assert!(store.insert_message(&msg, true).unwrap().is_none());
}

#[test]
fn duplicate_by_fingerprint_with_different_id_is_skipped() {
    let store = Store::open_in_memory().unwrap();
    let first = sample_message("m1", "alice", "hello", 1000);
    let mut second = sample_message("m2", "alice", "hello", 1000);
    second.fingerprint = first.fingerprint.clone();

    assert!(store.insert_message(&first, true).unwrap().is_some());
    assert!(store.insert_message(&second, true).unwrap().is_none());
}

#[test]
fn near_duplicate_within_1000ms_is_skipped() {
    let store = Store::open_in_memory().unwrap();
    let first = sample_message("m1", "alice", "hello", 1000);
    let second = sample_message("m2", "alice", "hello", 1500);

    assert!(store.insert_message(&first, true).unwrap().is_some());
    assert!(store.insert_message(&second, true).unwrap().is_none());
}

#[test]
fn near_duplicate_outside_window_is_not_skipped() {
    let store = Store::open_in_memory().unwrap();
    let first = sample_message("m1", "alice", "hello", 1000);
    let second = sample_message("m2", "alice", "hello", 3000);

    assert!(store.insert_message(&first, true).unwrap().is_some());
    assert!(store.insert_message(&second, true).unwrap().is_some());
}

#[test]
fn near_duplicate_exactly_at_1000ms_is_not_skipped() {
    let store = Store::open_in_memory().unwrap();
    let first = sample_message("m1", "alice", "hello", 1000);
    let second = sample_message("m2", "alice", "hello", 2000);

    assert!(store.insert_message(&first, true).unwrap().is_some());
    assert!(store.insert_message(&second, true).unwrap().is_some());
}

#[test]
fn insert_messages_batch_reports_inserted_and_skipped() {
    let store = Store::open_in_memory().unwrap();
    let batch = vec![
        sample_message("m1", "alice", "hi", 1000),
        sample_message("m1", "alice", "hi", 1000),
        sample_message("m2", "bob", "yo", 2000),
    ];
    let result = store.insert_messages_batch(&batch).unwrap();
    assert_eq!(result.inserted, 2);
    assert_eq!(result.skipped, 1);
}

#[test]
fn edit_and_soft_delete_round_trip() {
    let store = Store::open_in_memory().unwrap();
    let msg = sample_message("m1", "alice", "hello", 1000);
    store.insert_message(&msg, true).unwrap();

    assert!(store.update_message("m1", "hi", 1100).unwrap());
    store.soft_delete_message("m1", 1200).unwrap();

    let visible = store.query_messages(&MessageFilter::default()).unwrap();
    assert!(visible.is_empty());

    let with_deleted = store
        .query_messages(&MessageFilter {
            include_deleted: true,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(with_deleted.len(), 1);
    assert_eq!(with_deleted[0].content_text.as_deref(), Some("hi"));
    assert_eq!(with_deleted[0].edited_at, Some(1100));
    assert_eq!(with_deleted[0].deleted_at, Some(1200));
}

#[test]
fn update_message_on_missing_id_is_silent_noop() {
    let store = Store::open_in_memory().unwrap();
    assert!(!store.update_message("missing", "hi", 1000).unwrap());
}

#[test]
fn reaction_add_remove_readd_clears_removed_at() {
    let store = Store::open_in_memory().unwrap();
    let msg = sample_message("m1", "alice", "hello", 1000);
    store.insert_message(&msg, true).unwrap();

    store.add_reaction("m1", "👍", "bob", Some("Bob")).unwrap();
    assert!(store.remove_reaction("m1", "👍", "bob").unwrap());
    assert!(!store.remove_reaction("m1", "👍", "bob").unwrap());

    store.add_reaction("m1", "👍", "bob", Some("Bob")).unwrap();
}

#[test]
fn fts_search_finds_inserted_message_and_not_after_edit() {
    let store = Store::open_in_memory().unwrap();
    let msg = sample_message("m1", "alice", "the quick fox", 1000);
    store.insert_message(&msg, true).unwrap();

    let hits = store.search("quick", 10).unwrap();
    assert_eq!(hits.len(), 1);

    store.update_message("m1", "something else entirely", 1100).unwrap();
    let stale = store.search("quick", 10).unwrap();
    assert!(stale.is_empty());

    let fresh = store.search("entirely", 10).unwrap();
    assert_eq!(fresh.len(), 1);
}

#[test]
fn session_event_fan_out_links_to_parent() {
    let store = Store::open_in_memory().unwrap();
    let parent = Event {
        event_id: "M".to_string(),
        parent_event_id: None,
        session_key: "agent:main:main".to_string(),
        session_id: Some("AAA".to_string()),
        event_type: EventType::Message,
        event_subtype: None,
        timestamp: 1000,
        ingested_at: 1000,
        raw_json: json!({"role": "assistant"}),
        role: Some("assistant".to_string()),
        tool_name: None,
        model_provider: None,
        model_id: None,
        is_error: false,
        size_bytes: 10,
    };
    let tool_call = Event {
        event_id: tool_call_event_id("M", "T1"),
        parent_event_id: Some("M".to_string()),
        session_key: "agent:main:main".to_string(),
        session_id: Some("AAA".to_string()),
        event_type: EventType::ToolCall,
        event_subtype: None,
        timestamp: 1000,
        ingested_at: 1000,
        raw_json: json!({"id": "T1", "name": "exec", "arguments": {}}),
        role: Some("assistant".to_string()),
        tool_name: Some("exec".to_string()),
        model_provider: None,
        model_id: None,
        is_error: false,
        size_bytes: 20,
    };
    let thinking = Event {
        event_id: thinking_block_event_id("M"),
        parent_event_id: Some("M".to_string()),
        session_key: "agent:main:main".to_string(),
        session_id: Some("AAA".to_string()),
        event_type: EventType::ThinkingBlock,
        event_subtype: None,
        timestamp: 1000,
        ingested_at: 1000,
        raw_json: json!({"content": "thinking...", "signature": "sig"}),
        role: None,
        tool_name: None,
        model_provider: None,
        model_id: None,
        is_error: false,
        size_bytes: 500,
    };
    let usage = Event {
        event_id: usage_stats_event_id("M"),
        parent_event_id: Some("M".to_string()),
        session_key: "agent:main:main".to_string(),
        session_id: Some("AAA".to_string()),
        event_type: EventType::UsageStats,
        event_subtype: None,
        timestamp: 1000,
        ingested_at: 1000,
        raw_json: json!({"input_tokens": 100, "output_tokens": 50, "total_tokens": 150, "cost": {"total": 0.003}}),
        role: None,
        tool_name: None,
        model_provider: Some("anthropic".to_string()),
        model_id: Some("claude".to_string()),
        is_error: false,
        size_bytes: 5,
    };

    let batch = vec![parent, tool_call, thinking, usage];
    let result = store
        .insert_events_batch(&batch, "agent:main:main", Some("AAA"), false)
        .unwrap();
    assert_eq!(result.inserted, 4);
    assert_eq!(result.errors, 0);

    let events = store
        .session_events(
            "AAA",
            &EventFilter {
                include_thinking: true,
                include_usage: true,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(events.len(), 4);
    assert_eq!(events.iter().filter(|e| e.parent_event_id.as_deref() == Some("M")).count(), 3);
}

#[test]
fn referential_error_counted_under_normal_scan_suppressed_under_force() {
    let store = Store::open_in_memory().unwrap();
    let orphan_child = Event {
        event_id: tool_call_event_id("missing-parent", "T1"),
        parent_event_id: Some("missing-parent".to_string()),
        session_key: "agent:main:main".to_string(),
        session_id: Some("AAA".to_string()),
        event_type: EventType::ToolCall,
        event_subtype: None,
        timestamp: 1000,
        ingested_at: 1000,
        raw_json: json!({}),
        role: None,
        tool_name: Some("exec".to_string()),
        model_provider: None,
        model_id: None,
        is_error: false,
        size_bytes: 10,
    };

    let normal = store
        .insert_events_batch(&[orphan_child.clone()], "agent:main:main", Some("AAA"), false)
        .unwrap();
    assert_eq!(normal.inserted, 0);
    assert_eq!(normal.errors, 1);

    let forced = store
        .insert_events_batch(&[orphan_child], "agent:main:main", Some("AAA"), true)
        .unwrap();
    assert_eq!(forced.inserted, 1);
    assert_eq!(forced.errors, 0);
}

#[test]
fn idempotent_reingest_of_same_file_reports_zero_inserted() {
    let store = Store::open_in_memory().unwrap();
    let events = vec![session_event("AAA", 1000)];

    let first = store
        .insert_events_batch(&events, "agent:main:main", None, false)
        .unwrap();
    assert_eq!(first.inserted, 1);

    let second = store
        .insert_events_batch(&events, "agent:main:main", None, false)
        .unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 1);
}

#[test]
fn session_id_backfilled_from_first_session_event_in_batch() {
    let store = Store::open_in_memory().unwrap();
    let mut child = session_event("child", 1100);
    child.event_type = EventType::Custom;
    child.event_subtype = Some("note".to_string());
    child.session_id = None;

    let batch = vec![session_event("AAA", 1000), child];
    store
        .insert_events_batch(&batch, "agent:main:main", None, false)
        .unwrap();

    let events = store.session_events("AAA", &EventFilter::default()).unwrap();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.session_id.as_deref() == Some("AAA")));
}

#[test]
fn export_session_jsonl_omits_synthetic_events() {
    let store = Store::open_in_memory().unwrap();
    let parent = {
        let mut e = session_event("AAA", 1000);
        e.event_type = EventType::Message;
        e.raw_json = json!({"type": "message", "role": "assistant"});
        e
    };
    let tool_call = Event {
        event_id: tool_call_event_id("AAA", "T1"),
        parent_event_id: Some("AAA".to_string()),
        session_key: "agent:main:main".to_string(),
        session_id: Some("AAA".to_string()),
        event_type: EventType::ToolCall,
        event_subtype: None,
        timestamp: 1000,
        ingested_at: 1000,
        raw_json: json!({}),
        role: None,
        tool_name: Some("exec".to_string()),
        model_provider: None,
        model_id: None,
        is_error: false,
        size_bytes: 10,
    };

    store
        .insert_events_batch(&[parent, tool_call], "agent:main:main", Some("AAA"), false)
        .unwrap();

    let jsonl = store.export_session_jsonl("AAA").unwrap();
    let lines: Vec<&str> = jsonl.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("\"id\":\"AAA\""));
}

#[test]
fn session_upsert_and_count_refresh() {
    let store = Store::open_in_memory().unwrap();
    let session = Session {
        id: "AAA".to_string(),
        session_key: "agent:main:main".to_string(),
        session_type: SessionType::Main,
        parent_session_id: None,
        label: None,
        agent_id: Some("main".to_string()),
        model: None,
        started_at: 1000,
        ended_at: None,
        status: SessionStatus::Active,
        title: None,
        summary: None,
        message_count: 0,
        event_count: 0,
        created_at: 1000,
        updated_at: 1000,
    };
    assert!(store.upsert_session(&session).unwrap());
    assert!(!store.upsert_session(&session).unwrap());

    let events = vec![session_event("AAA", 1000)];
    store
        .insert_events_batch(&events, "agent:main:main", None, false)
        .unwrap();

    let refreshed = store.refresh_session_counts(Some("AAA")).unwrap();
    assert_eq!(refreshed, 1);

    let found = store
        .query_sessions(&Default::default())
        .unwrap();
    assert_eq!(found[0].event_count, 1);
}

#[test]
fn checkpoint_round_trips_and_is_readable_as_none_initially() {
    let store = Store::open_in_memory().unwrap();
    assert_eq!(store.checkpoint("last_scan_timestamp", None).unwrap(), None);
    store.checkpoint("last_scan_timestamp", Some("12345")).unwrap();
    assert_eq!(
        store.checkpoint("last_scan_timestamp", None).unwrap(),
        Some("12345".to_string())
    );
}

#[test]
fn vacuum_runs_without_error() {
    let store = Store::open_in_memory().unwrap();
    store.vacuum().unwrap();
}
