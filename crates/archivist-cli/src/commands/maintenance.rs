use archivist_store::Store;

/// `archivist maintenance vacuum` (spec §4.1 `vacuum`, invariant I6).
pub fn vacuum(store: &Store, json: bool) -> crate::Result<()> {
    store.vacuum()?;
    if !json {
        println!("vacuumed");
    }
    Ok(())
}

/// `archivist maintenance refresh-counts` (spec §4.1 `refresh_session_counts`,
/// invariant I6: session `message_count`/`event_count` are recomputed from
/// the Event table, never trusted as incrementally maintained).
pub fn refresh_counts(store: &Store, session: Option<&str>, json: bool) -> crate::Result<()> {
    let updated = store.refresh_session_counts(session)?;
    if !json {
        println!("refreshed counts for {updated} session(s)");
    }
    Ok(())
}
