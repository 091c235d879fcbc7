use archivist_types::timestamp::format_millis_rfc3339;

/// Renders an epoch-millis timestamp for human display, or a placeholder
/// when absent.
pub fn fmt_time(ts: Option<i64>) -> String {
    ts.map(format_millis_rfc3339).unwrap_or_else(|| "-".to_string())
}

/// Prints `value` as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(err) => eprintln!("archivist: failed to serialize output: {}", err),
    }
}
