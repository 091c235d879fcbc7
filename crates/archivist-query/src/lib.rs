//! Query Surface: read-only list/filter/search/export/reconstruct operations
//! over the archivist store (spec §4.6). Never mutates the Store.

mod detail;
mod domain;
mod error;
mod export;
mod list;

pub use detail::session_detail;
pub use domain::{SessionDetail, SessionListEntry};
pub use error::{Error, Result};
pub use export::{export_session, ExportFormat};
pub use list::list_sessions;
