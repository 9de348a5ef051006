//! Link status panel: one row per link direction.

use crate::model::{format_delta, LinkInfo};
use crate::state::StatusBoard;
use crate::view::MonitorStyles;
use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

const COLUMN_TITLES: [&str; 7] = ["Link", "State", "TX", "RX", "Pending", "Delay", ""];

const COLUMN_WIDTHS: [Constraint; 7] = [
    Constraint::Length(24),
    Constraint::Length(6),
    Constraint::Length(8),
    Constraint::Length(8),
    Constraint::Length(8),
    Constraint::Length(14),
    Constraint::Min(10),
];

/// Most directions shown before the panel stops growing.
const MAX_VISIBLE_LINKS: u16 = 8;

/// Height the panel wants for the current board, borders included.
pub fn panel_height(board: &StatusBoard) -> u16 {
    let rows = u16::try_from(board.snapshots().count()).unwrap_or(u16::MAX);
    rows.clamp(1, MAX_VISIBLE_LINKS) + 3
}

fn optional(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Cell texts of one snapshot.
pub fn link_cells(info: &LinkInfo) -> [String; 7] {
    let delay = match info.pending_delay {
        Some(delay) if info.has_pending() => format_delta(delay),
        _ => "-".to_string(),
    };
    let note = if info.is_delivering() {
        "Delivering".to_string()
    } else {
        String::new()
    };
    [
        info.label(),
        info.link_state().badge(),
        optional(info.tx_seq),
        optional(info.rx_seq),
        optional(info.pending_count),
        delay,
        note,
    ]
}

/// Render the panel into `area`.
pub fn render_status_panel(
    frame: &mut Frame,
    area: Rect,
    board: &StatusBoard,
    styles: &MonitorStyles,
) {
    let rows: Vec<Row> = if board.snapshots().next().is_none() {
        let text = if board.is_refreshing() {
            "loading…"
        } else {
            "no links"
        };
        vec![Row::new(vec![Cell::from(text)]).style(styles.muted())]
    } else {
        board
            .snapshots()
            .map(|(_, info)| Row::new(link_cells(info).map(Cell::from)).style(styles.link(info)))
            .collect()
    };

    let title = if board.is_refreshing() {
        " Links (refreshing) "
    } else {
        " Links "
    };

    let table = Table::new(rows, COLUMN_WIDTHS)
        .header(Row::new(COLUMN_TITLES).style(styles.table_header()))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}
