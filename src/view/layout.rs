//! Screen layout.
//!
//! Header bar, link status panel, event table and status bar, top to bottom.

use crate::state::AppState;
use crate::view::{events_table, status_panel, LiveIndicator, MonitorStyles};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Render the whole screen. Returns the number of visible event rows.
pub fn render_layout(frame: &mut Frame, state: &AppState) -> usize {
    let styles = MonitorStyles::new();

    let panel_height = status_panel::panel_height(&state.status);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // Header bar
            Constraint::Length(panel_height), // Link status
            Constraint::Min(0),               // Event table
            Constraint::Length(1),            // Status bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], state, &styles);
    status_panel::render_status_panel(frame, chunks[1], &state.status, &styles);
    let viewport = events_table::render_events_table(frame, chunks[2], state, &styles);
    render_status_bar(frame, chunks[3], state, &styles);

    viewport
}

/// Title, backend URL and backend version.
fn render_header(frame: &mut Frame, area: Rect, state: &AppState, styles: &MonitorStyles) {
    let version = state.status.version().unwrap_or("?");
    let line = Line::from(vec![
        Span::styled(" BTP Monitor ", styles.header()),
        Span::raw(format!("│ {} │ backend {version}", state.base_url)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Status bar text without the LIVE indicator.
pub fn status_summary(state: &AppState) -> String {
    let stream = &state.stream;
    let range = match stream.range() {
        Some(range) => format!("sn {}..{}", range.first, range.last),
        None => "empty".to_string(),
    };
    let link = match stream.filter().link() {
        Some(link) => format!(" ({})", state.catalog.label(link)),
        None => String::new(),
    };
    format!(
        "{}{link} │ {range} │ {} records",
        stream.filter().describe(),
        stream.window().len()
    )
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, styles: &MonitorStyles) {
    let mut spans = vec![
        LiveIndicator::new(state.stream.health()).render(),
        Span::raw(status_summary(state)),
    ];

    let error = state
        .stream
        .last_failure()
        .or_else(|| state.status.last_error());
    if let Some(error) = error {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(format!("error: {error}"), styles.error()));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
