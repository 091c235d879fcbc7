pub mod events;
pub mod messages;
pub mod scanner_state;
pub mod sessions;
