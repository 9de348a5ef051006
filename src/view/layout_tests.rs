//! Tests for screen layout rendering.

use super::*;
use crate::gateway::{Completion, Job};
use crate::model::{EventKind, FetchError, LinkInfo, LinkKey, LinkSummary, LogRecord, Sn};
use crate::state::AppState;
use crate::stream::{FilterState, StreamPolicy};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use std::time::{Duration, Instant};

// ===== Test Helpers =====

fn create_test_terminal() -> Terminal<TestBackend> {
    let backend = TestBackend::new(120, 24);
    Terminal::new(backend).unwrap()
}

fn started_state(now: Instant) -> AppState {
    let mut state = AppState::new(
        "http://localhost:8000",
        FilterState::default(),
        StreamPolicy::default(),
        Duration::from_secs(10),
    );
    state.start(now);
    state
}

fn tx(sn: u64) -> LogRecord {
    LogRecord {
        sn: Sn::new(sn),
        ts: 1_700_000_000.0,
        event: EventKind::Tx,
        src: Some("0x7.icon".to_string()),
        dst: Some("0x1.eth".to_string()),
        src_name: Some("ICON".to_string()),
        dst_name: Some("Sepolia".to_string()),
        extra: r#"{"count": 1}"#.to_string(),
    }
}

/// Answer every due job: events with `records`, other jobs with failures.
fn answer(state: &mut AppState, now: Instant, records: &[LogRecord]) {
    for job in state.due_jobs(now) {
        if let Job::Events(ticket) = job {
            state.apply_completion(
                Completion::Events {
                    ticket,
                    result: Ok(records.to_vec()),
                },
                now,
            );
        }
    }
}

fn render(state: &AppState) -> (String, usize) {
    let mut terminal = create_test_terminal();
    let mut viewport = 0;
    terminal
        .draw(|frame| viewport = render_layout(frame, state))
        .unwrap();
    (buffer_text(&terminal), viewport)
}

fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let width = usize::from(buffer.area.width);
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

// ===== Header and status bar =====

#[test]
fn empty_state_shows_header_and_status_bar() {
    let now = Instant::now();
    let state = started_state(now);
    let (text, _) = render(&state);

    assert!(text.contains("BTP Monitor"), "header title missing:\n{text}");
    assert!(text.contains("http://localhost:8000"));
    assert!(text.contains("backend ?"));
    assert!(text.contains("[LIVE]"));
    assert!(text.contains("events=default link=all"));
    assert!(text.contains("empty"));
}

#[test]
fn returns_visible_event_rows() {
    let now = Instant::now();
    let state = started_state(now);
    let (_, viewport) = render(&state);

    // 24 rows: header 1, empty link panel 4, status bar 1, table borders and header 3.
    assert_eq!(viewport, 15);
}

#[test]
fn backend_version_in_header() {
    let now = Instant::now();
    let mut state = started_state(now);
    state.apply_completion(Completion::Version(Ok("2.1.0".to_string())), now);

    let (text, _) = render(&state);
    assert!(text.contains("backend 2.1.0"));
}

// ===== Event table =====

#[test]
fn records_render_with_pagination_row() {
    let now = Instant::now();
    let mut state = started_state(now);
    answer(&mut state, now, &[tx(50), tx(49)]);

    let (text, _) = render(&state);
    assert!(text.contains("...LOAD PREVIOUS..."), "missing pagination row:\n{text}");
    assert!(text.contains("ICON→Sepolia"));
    assert!(text.contains("count=1"));
    assert!(text.contains("sn 49..50"));
    assert!(text.contains("2 records"));
}

#[test]
fn pending_backward_page_shows_loading() {
    let now = Instant::now();
    let mut state = started_state(now);
    answer(&mut state, now, &[tx(50), tx(49)]);
    assert!(state.stream.load_previous(now));

    let (text, _) = render(&state);
    assert!(text.contains("loading…"));
    assert!(!text.contains("...LOAD PREVIOUS..."));
}

#[test]
fn window_starting_at_one_has_no_pagination_row() {
    let now = Instant::now();
    let mut state = started_state(now);
    answer(&mut state, now, &[tx(2), tx(1)]);

    let (text, _) = render(&state);
    assert!(!text.contains("LOAD PREVIOUS"));
}

// ===== Link status panel =====

#[test]
fn link_snapshots_render_in_panel() {
    let now = Instant::now();
    let mut state = started_state(now);
    state.due_jobs(now);
    let follow_up = state.apply_completion(
        Completion::Links(Ok(vec![LinkSummary {
            src: "0x7.icon".to_string(),
            dst: "0x1.eth".to_string(),
            src_name: Some("ICON".to_string()),
            dst_name: Some("Sepolia".to_string()),
        }])),
        now,
    );
    assert_eq!(follow_up.len(), 2);

    let link = LinkKey::new("0x7.icon", "0x1.eth").unwrap();
    state.apply_completion(
        Completion::LinkInfo {
            link,
            result: Ok(LinkInfo {
                src: "0x7.icon".to_string(),
                dst: "0x1.eth".to_string(),
                src_name: Some("ICON".to_string()),
                dst_name: Some("Sepolia".to_string()),
                state: "good".to_string(),
                tx_seq: Some(12),
                rx_seq: Some(10),
                tx_height: None,
                rx_height: None,
                pending_count: Some(2),
                pending_delay: Some(30.0),
                time_limit: Some(600),
            }),
        },
        now,
    );

    let (text, _) = render(&state);
    assert!(text.contains("GOOD"), "missing badge:\n{text}");
    assert!(text.contains("Delivering"));
    assert!(text.contains("30s"));
    assert!(text.contains("Links (refreshing)"));
}

// ===== Errors =====

#[test]
fn fetch_failure_shows_error() {
    let now = Instant::now();
    let mut state = started_state(now);
    for job in state.due_jobs(now) {
        if let Job::Events(ticket) = job {
            state.apply_completion(
                Completion::Events {
                    ticket,
                    result: Err(FetchError::Transport {
                        url: "http://localhost:8000/events".to_string(),
                        reason: "connection refused".to_string(),
                    }),
                },
                now,
            );
        }
    }

    let (text, _) = render(&state);
    assert!(text.contains("error:"), "missing error:\n{text}");
    assert!(text.contains("connection refused"));
}

#[test]
fn status_summary_names_selected_link() {
    let now = Instant::now();
    let mut state = started_state(now);
    state.catalog.set_listed(&[LinkSummary {
        src: "a".to_string(),
        dst: "b".to_string(),
        src_name: Some("Alpha".to_string()),
        dst_name: Some("Beta".to_string()),
    }]);
    let filter = state
        .stream
        .filter()
        .with_link(Some(LinkKey::new("a", "b").unwrap()));
    state.stream.set_filter(filter, now);

    let summary = status_summary(&state);
    assert!(summary.contains("link=a:b"), "{summary}");
    assert!(summary.contains("(Alpha→Beta)"));
    assert!(summary.contains("0 records"));
}
