//! Event log table.
//!
//! Columns: SN, local time, event class, link, decoded payload. While older
//! records may exist a pagination row sits above the first record.

use crate::model::LogRecord;
use crate::state::AppState;
use crate::stream::LinkCatalog;
use crate::view::MonitorStyles;
use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

/// Text of the pagination row while more history can be requested.
pub const LOAD_PREVIOUS_LABEL: &str = "...LOAD PREVIOUS...";

/// Text of the pagination row while a backward page is in flight.
pub const LOADING_LABEL: &str = "loading…";

const COLUMN_TITLES: [&str; 5] = ["SN", "Time", "Event", "Link", "Extra"];

const COLUMN_WIDTHS: [Constraint; 5] = [
    Constraint::Length(8),
    Constraint::Length(19),
    Constraint::Length(6),
    Constraint::Length(24),
    Constraint::Min(10),
];

/// Rows that fit in `area` once borders and the header are drawn.
pub fn viewport_rows(area: Rect) -> usize {
    usize::from(area.height.saturating_sub(3))
}

/// Cell texts of one record.
pub fn record_cells(record: &LogRecord, catalog: &LinkCatalog) -> [String; 5] {
    let detail = record.detail();
    let link = if detail.has_link() {
        link_cell(record, catalog)
    } else {
        String::new()
    };
    [
        record.sn.to_string(),
        record.local_time_label(),
        record.event.as_str().to_uppercase(),
        link,
        detail.summary(),
    ]
}

fn link_cell(record: &LogRecord, catalog: &LinkCatalog) -> String {
    let name = |name: &Option<String>, id: &Option<String>| match (name, id) {
        (Some(name), _) => name.clone(),
        (None, Some(id)) => catalog.network_name(id).to_string(),
        (None, None) => String::new(),
    };
    format!(
        "{}→{}",
        name(&record.src_name, &record.src),
        name(&record.dst_name, &record.dst)
    )
}

/// Which rows fall inside the viewport.
///
/// `offset` counts the pagination row when present. Returns whether that row
/// is visible and the index range of visible records.
fn visible_slice(
    pagination: bool,
    records: usize,
    offset: usize,
    viewport: usize,
) -> (bool, std::ops::Range<usize>) {
    let show_pagination = pagination && offset == 0 && viewport > 0;
    let skipped = if pagination { offset.saturating_sub(1) } else { offset };
    let start = skipped.min(records);
    let room = viewport - usize::from(show_pagination);
    (show_pagination, start..(start + room).min(records))
}

/// Render the table into `area`. Returns the number of visible row slots.
pub fn render_events_table(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    styles: &MonitorStyles,
) -> usize {
    let viewport = viewport_rows(area);
    let offset = state.scroll.resolve(state.table_rows(), viewport);

    let (show_pagination, visible) =
        visible_slice(state.shows_pagination_row(), state.stream.window().len(), offset, viewport);

    let pagination = show_pagination.then(|| {
        let label = if state.stream.is_loading_previous() {
            LOADING_LABEL
        } else {
            LOAD_PREVIOUS_LABEL
        };
        Row::new(vec![Cell::from(""), Cell::from(label)]).style(styles.pagination())
    });

    let records = state.stream.window().records().range(visible).map(|record| {
        Row::new(record_cells(record, &state.catalog).map(Cell::from))
            .style(styles.event(&record.event))
    });

    let rows: Vec<Row> = pagination.into_iter().chain(records).collect();

    let title = match state.stream.range() {
        Some(range) => format!(" Events {}..{} ", range.first, range.last),
        None => " Events ".to_string(),
    };

    let table = Table::new(rows, COLUMN_WIDTHS)
        .header(Row::new(COLUMN_TITLES).style(styles.table_header()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::raw(title)),
        );
    frame.render_widget(table, area);

    viewport
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventKind, LinkSummary, Sn};

    fn record(event: EventKind, src: Option<&str>, extra: &str) -> LogRecord {
        LogRecord {
            sn: Sn::new(42),
            ts: 0.0,
            event,
            src: src.map(str::to_string),
            dst: src.map(|_| "0x1.eth".to_string()),
            src_name: None,
            dst_name: Some("Sepolia".to_string()),
            extra: extra.to_string(),
        }
    }

    #[test]
    fn visible_slice_covers_only_the_viewport() {
        assert_eq!(visible_slice(true, 500, 0, 10), (true, 0..9));
        assert_eq!(visible_slice(true, 500, 1, 10), (false, 0..10));
        assert_eq!(visible_slice(true, 500, 491, 10), (false, 490..500));
        assert_eq!(visible_slice(false, 500, 495, 10), (false, 495..500));
    }

    #[test]
    fn visible_slice_handles_small_windows() {
        assert_eq!(visible_slice(true, 3, 0, 10), (true, 0..3));
        assert_eq!(visible_slice(false, 0, 0, 10), (false, 0..0));
        assert_eq!(visible_slice(true, 3, 0, 0), (false, 0..0));
        assert_eq!(visible_slice(false, 3, 7, 10), (false, 3..3));
    }

    #[test]
    fn viewport_excludes_borders_and_header() {
        assert_eq!(viewport_rows(Rect::new(0, 0, 80, 13)), 10);
        assert_eq!(viewport_rows(Rect::new(0, 0, 80, 2)), 0);
    }

    #[test]
    fn tx_row_shows_link_and_count() {
        let mut catalog = LinkCatalog::new();
        catalog.set_listed(&[LinkSummary {
            src: "0x7.icon".to_string(),
            dst: "0x1.eth".to_string(),
            src_name: Some("ICON".to_string()),
            dst_name: None,
        }]);
        let cells = record_cells(
            &record(EventKind::Tx, Some("0x7.icon"), r#"{"count": 3}"#),
            &catalog,
        );

        assert_eq!(cells[0], "42");
        assert_eq!(cells[2], "TX");
        assert_eq!(cells[3], "ICON→Sepolia");
        assert_eq!(cells[4], "count=3");
    }

    #[test]
    fn log_row_has_no_link() {
        let cells = record_cells(
            &record(EventKind::Log, None, r#"{"message": "started"}"#),
            &LinkCatalog::new(),
        );
        assert_eq!(cells[2], "LOG");
        assert_eq!(cells[3], "");
    }

    #[test]
    fn unknown_endpoint_name_falls_back_to_id() {
        let cells = record_cells(
            &record(EventKind::Tx, Some("0x7.icon"), r#"{"count": 1}"#),
            &LinkCatalog::new(),
        );
        assert_eq!(cells[3], "0x7.icon→Sepolia");
    }
}
