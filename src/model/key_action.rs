//! Domain-level keyboard actions independent of key bindings.

/// Domain-level actions that can be mapped to configurable key bindings.
///
/// These represent user intent, not specific keys. The mapping from
/// crossterm::event::KeyEvent to KeyAction is handled by KeyBindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    // Scrolling
    /// Scroll the event table up by one row. Default: k/↑
    ScrollUp,
    /// Scroll the event table down by one row. Default: j/↓
    ScrollDown,
    /// Scroll up by one page height. Default: Ctrl+u/Page Up
    PageUp,
    /// Scroll down by one page height. Default: Ctrl+d/Page Down
    PageDown,
    /// Jump to the oldest loaded event. Default: g/Home
    ScrollToTop,
    /// Jump to the newest loaded event. Default: G/End
    ScrollToBottom,

    // Event window
    /// Extend the backlog target one page further into history. Default: p
    LoadPrevious,
    /// Toggle one class of the fixed event enumeration (index into
    /// `EventKind::known()`). Default: 1-4
    ToggleEventClass(usize),
    /// Clear the event-class filter (server default set). Default: a
    ClearEventFilter,
    /// Cycle the link filter through the known links and back to "all". Default: L
    CycleLink,

    // Status panel
    /// Refresh link status snapshots now. Default: r
    RefreshStatus,

    // Application
    /// Exit the monitor. Default: q
    Quit,
}

impl KeyAction {
    /// Whether this action changes the event table's scroll position.
    pub fn is_scroll(&self) -> bool {
        matches!(
            self,
            KeyAction::ScrollUp
                | KeyAction::ScrollDown
                | KeyAction::PageUp
                | KeyAction::PageDown
                | KeyAction::ScrollToTop
                | KeyAction::ScrollToBottom
        )
    }
}
