//! LIVE indicator widget for the status bar.
//!
//! - Green when the stream is caught up with the live edge
//! - Yellow while catching up or before the first page arrives
//! - Red after a failed fetch

use crate::stream::StreamHealth;
use ratatui::{
    style::{Color, Style},
    text::Span,
};

/// Text content for the LIVE indicator.
const LIVE_INDICATOR_PREFIX: &str = "[LIVE] ";

/// LIVE indicator widget that renders based on [`StreamHealth`].
///
/// This widget is pure and stateless; the health is read from the stream
/// engine on every draw.
///
/// # Examples
///
/// ```rust
/// use btp_monitor::stream::StreamHealth;
/// use btp_monitor::view::live_indicator::LiveIndicator;
///
/// let span = LiveIndicator::new(StreamHealth::Live).render();
/// assert_eq!(span.content, "[LIVE] ");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LiveIndicator {
    health: StreamHealth,
}

impl LiveIndicator {
    /// Create an indicator for the given stream health.
    pub fn new(health: StreamHealth) -> Self {
        Self { health }
    }

    /// Render the indicator as a ratatui Span.
    pub fn render(&self) -> Span<'static> {
        let color = match self.health {
            StreamHealth::Live => Color::Green,
            StreamHealth::CatchingUp | StreamHealth::Starting => Color::Yellow,
            StreamHealth::Retrying => Color::Red,
        };
        Span::styled(LIVE_INDICATOR_PREFIX, Style::default().fg(color))
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "live_indicator_tests.rs"]
mod tests;
