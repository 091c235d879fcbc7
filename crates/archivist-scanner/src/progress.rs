use std::path::Path;

/// Typed progress events emitted during a scan. There is no logging/tracing
/// crate in this stack; callers that want visibility (the CLI) pass a
/// closure, and `scan` also prints terse `println!`/`eprintln!` lines for
/// anyone running it unattended.
#[derive(Debug, Clone)]
pub enum ScanProgress<'a> {
    FacetStarted { facet: &'static str },
    FileSkippedUnchanged { path: &'a Path },
    FileProcessed { path: &'a Path },
    FileFailed { path: &'a Path, message: String },
    FacetFinished { facet: &'static str },
}
