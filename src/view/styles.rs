//! Colour scheme for the monitor panes.
//!
//! Event rows are coloured by class and link rows by health.

use crate::model::{EventKind, LinkInfo, LinkState};
use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Colours are disabled when the `NO_COLOR` environment variable is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Explicit configuration.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Colours on unless `NO_COLOR` is set (any value).
    pub fn from_env() -> Self {
        Self::new(std::env::var_os("NO_COLOR").is_none())
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== MonitorStyles =====

/// Styles shared by the event table, status panel and status bar.
#[derive(Debug, Clone, Copy)]
pub struct MonitorStyles {
    colors: ColorConfig,
}

impl MonitorStyles {
    /// Styles honouring `NO_COLOR`.
    pub fn new() -> Self {
        Self::with_color_config(ColorConfig::from_env())
    }

    /// Styles with an explicit colour configuration.
    pub fn with_color_config(colors: ColorConfig) -> Self {
        Self { colors }
    }

    fn fg(&self, color: Color) -> Style {
        if self.colors.colors_enabled() {
            Style::default().fg(color)
        } else {
            Style::default()
        }
    }

    /// Row style for an event class.
    pub fn event(&self, kind: &EventKind) -> Style {
        match kind {
            EventKind::Tx => self.fg(Color::Cyan),
            EventKind::Rx => self.fg(Color::Green),
            EventKind::State => self.fg(Color::Yellow),
            EventKind::Log | EventKind::Other(_) => Style::default(),
        }
    }

    /// Badge style for a link snapshot.
    ///
    /// Good links with messages waiting are yellow rather than green.
    pub fn link(&self, info: &LinkInfo) -> Style {
        match info.link_state() {
            LinkState::Good if info.has_pending() => self.fg(Color::Yellow),
            LinkState::Good => self.fg(Color::Green),
            LinkState::Bad => self.fg(Color::Red).add_modifier(Modifier::BOLD),
            LinkState::Other(_) => self.fg(Color::Gray),
        }
    }

    /// The "...LOAD PREVIOUS..." and "loading…" row.
    pub fn pagination(&self) -> Style {
        self.fg(Color::DarkGray).add_modifier(Modifier::ITALIC)
    }

    /// Table header row.
    pub fn table_header(&self) -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    /// Header bar.
    pub fn header(&self) -> Style {
        self.fg(Color::White).add_modifier(Modifier::BOLD)
    }

    /// Error text in the status bar.
    pub fn error(&self) -> Style {
        self.fg(Color::Red)
    }

    /// Secondary text.
    pub fn muted(&self) -> Style {
        self.fg(Color::DarkGray)
    }
}

impl Default for MonitorStyles {
    fn default() -> Self {
        Self::new()
    }
}
