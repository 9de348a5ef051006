//! Keyboard bindings configuration.

use crate::model::key_action::KeyAction;
use crate::model::EventKind;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Maps keyboard events to domain actions.
///
/// Provides default vim-style bindings.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, KeyAction>,
}

impl KeyBindings {
    /// Look up the action for a key event.
    ///
    /// Only code and modifiers are compared; event kind and keyboard state
    /// reported by the terminal are ignored.
    pub fn get(&self, key: KeyEvent) -> Option<KeyAction> {
        self.bindings
            .get(&KeyEvent::new(key.code, key.modifiers))
            .copied()
    }

    fn bind(&mut self, code: KeyCode, modifiers: KeyModifiers, action: KeyAction) {
        self.bindings.insert(KeyEvent::new(code, modifiers), action);
    }

    /// Bind an upper-case letter with and without SHIFT; terminals disagree.
    fn bind_upper(&mut self, letter: char, action: KeyAction) {
        self.bind(KeyCode::Char(letter), KeyModifiers::SHIFT, action);
        self.bind(KeyCode::Char(letter), KeyModifiers::NONE, action);
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut keys = Self {
            bindings: HashMap::new(),
        };
        let none = KeyModifiers::NONE;

        // Vim-style scrolling
        keys.bind(KeyCode::Char('j'), none, KeyAction::ScrollDown);
        keys.bind(KeyCode::Char('k'), none, KeyAction::ScrollUp);
        keys.bind(KeyCode::Char('g'), none, KeyAction::ScrollToTop);
        keys.bind_upper('G', KeyAction::ScrollToBottom);

        // Arrow keys and paging
        keys.bind(KeyCode::Down, none, KeyAction::ScrollDown);
        keys.bind(KeyCode::Up, none, KeyAction::ScrollUp);
        keys.bind(KeyCode::Home, none, KeyAction::ScrollToTop);
        keys.bind(KeyCode::End, none, KeyAction::ScrollToBottom);
        keys.bind(KeyCode::PageDown, none, KeyAction::PageDown);
        keys.bind(KeyCode::PageUp, none, KeyAction::PageUp);
        keys.bind(KeyCode::Char('d'), KeyModifiers::CONTROL, KeyAction::PageDown);
        keys.bind(KeyCode::Char('u'), KeyModifiers::CONTROL, KeyAction::PageUp);

        // Event window
        keys.bind(KeyCode::Char('p'), none, KeyAction::LoadPrevious);
        for (index, digit) in ('1'..='9').take(EventKind::known().len()).enumerate() {
            keys.bind(KeyCode::Char(digit), none, KeyAction::ToggleEventClass(index));
        }
        keys.bind(KeyCode::Char('a'), none, KeyAction::ClearEventFilter);
        keys.bind_upper('L', KeyAction::CycleLink);

        // Status panel
        keys.bind(KeyCode::Char('r'), none, KeyAction::RefreshStatus);

        // Application
        keys.bind(KeyCode::Char('q'), none, KeyAction::Quit);
        keys.bind(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyAction::Quit);

        keys
    }
}
