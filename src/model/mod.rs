//! Domain model types (pure).
//!
//! All types in this module are plain data plus derivations; nothing here performs I/O.

pub mod detail;
pub mod error;
pub mod key_action;
pub mod link;
pub mod record;

// Re-export for convenience
pub use detail::{format_delta, DetailDecoder, DetailRegistry, EventDetail};
pub use error::{FetchError, InvalidLinkKey};
pub use key_action::KeyAction;
pub use link::{is_endpoint, LinkInfo, LinkKey, LinkState, LinkSummary, ENDPOINT_PLACEHOLDER};
pub use record::{EventKind, LogRecord, Sn};
