//! Vertical scrolling keyboard action handler for the event table.

use crate::model::KeyAction;
use crate::state::AppState;
use crate::view_state::scroll::ScrollPosition;

/// Apply a scroll action to the event table.
///
/// `viewport_height` is the number of table rows visible, used for page
/// scrolling and clamping. Non-scroll actions are ignored.
pub fn handle_scroll_action(state: &mut AppState, action: KeyAction, viewport_height: usize) {
    let total = state.table_rows();
    let page = viewport_height.max(1) as isize;

    state.scroll = match action {
        KeyAction::ScrollToTop => ScrollPosition::Top,
        KeyAction::ScrollToBottom => ScrollPosition::Bottom,
        KeyAction::ScrollUp => state.scroll.scrolled_by(-1, total, viewport_height),
        KeyAction::ScrollDown => state.scroll.scrolled_by(1, total, viewport_height),
        KeyAction::PageUp => state.scroll.scrolled_by(-page, total, viewport_height),
        KeyAction::PageDown => state.scroll.scrolled_by(page, total, viewport_height),
        _ => return,
    };
}
