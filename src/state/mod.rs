//! UI state machine (pure).
//!
//! All state transitions are plain functions over [`AppState`], testable
//! without a terminal. Time is passed in as `Instant`.

pub mod app_state;
pub mod scroll_handler;
pub mod status_board;

// Re-export for convenience
pub use app_state::AppState;
pub use scroll_handler::handle_scroll_action;
pub use status_board::StatusBoard;
