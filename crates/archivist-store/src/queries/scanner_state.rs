use rusqlite::{params, Connection, OptionalExtension};

use crate::Result;

/// Reads a ScannerState entry (spec §4.1 `checkpoint`).
pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value: Option<String> = conn
        .query_row("SELECT value FROM scanner_state WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(value)
}

/// Writes a ScannerState entry, returning the previous value if any.
pub fn set(conn: &Connection, key: &str, value: &str, now: i64) -> Result<Option<String>> {
    let previous = get(conn, key)?;
    conn.execute(
        r#"
        INSERT INTO scanner_state (key, value, updated_at) VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3
        "#,
        params![key, value, now],
    )?;
    Ok(previous)
}
