//! Top-level UI state of the monitor shell.

use super::status_board::StatusBoard;
use crate::gateway::{Completion, Job};
use crate::model::{EventKind, KeyAction};
use crate::stream::{CycleOutcome, EventStream, FilterState, LinkCatalog, StreamPolicy};
use crate::view_state::scroll::ScrollPosition;
use std::time::{Duration, Instant};
use tracing::info;

/// Everything the shell renders, plus the stream engine that feeds it.
///
/// All mutation happens on the UI thread. Network work is described by the
/// [`Job`]s returned from [`AppState::due_jobs`] and fed back through
/// [`AppState::apply_completion`].
#[derive(Debug)]
pub struct AppState {
    /// Backend base URL (header).
    pub base_url: String,
    /// Event-log stream engine.
    pub stream: EventStream,
    /// Known links for the selector.
    pub catalog: LinkCatalog,
    /// Link status snapshots.
    pub status: StatusBoard,
    /// Event table scroll position.
    pub scroll: ScrollPosition,
    /// Set when the user asks to exit.
    pub should_quit: bool,
}

impl AppState {
    /// Fresh state; nothing is fetched until [`AppState::start`].
    pub fn new(
        base_url: impl Into<String>,
        filter: FilterState,
        policy: StreamPolicy,
        status_interval: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            stream: EventStream::new(filter, policy),
            catalog: LinkCatalog::new(),
            status: StatusBoard::new(status_interval),
            scroll: ScrollPosition::Bottom,
            should_quit: false,
        }
    }

    /// Make the first stream cycle and status round due.
    pub fn start(&mut self, now: Instant) {
        self.stream.start(now);
        self.status.start(now);
    }

    /// Jobs that are due at `now`, stream first.
    pub fn due_jobs(&mut self, now: Instant) -> Vec<Job> {
        let mut jobs = Vec::new();
        if let Some(ticket) = self.stream.poll(now) {
            jobs.push(Job::Events(ticket));
        }
        jobs.extend(self.status.poll(now));
        jobs
    }

    /// Earliest instant at which [`AppState::due_jobs`] may return something.
    pub fn next_wake(&self) -> Option<Instant> {
        match (self.stream.next_wake(), self.status.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Merge a finished job. Returns follow-up jobs.
    pub fn apply_completion(&mut self, completion: Completion, now: Instant) -> Vec<Job> {
        match completion {
            Completion::Events { ticket, result } => {
                let outcome = self.stream.complete(&ticket, result, now);
                if matches!(
                    outcome,
                    CycleOutcome::Replaced | CycleOutcome::Prepended | CycleOutcome::Appended
                ) {
                    self.catalog.observe(self.stream.window().records());
                }
                self.apply_anchor();
                Vec::new()
            }
            other => self.status.apply(other, &mut self.catalog, now),
        }
    }

    /// Consume the stream's scroll hint, if any.
    pub fn apply_anchor(&mut self) {
        if let Some(position) = ScrollPosition::from_anchor(self.stream.take_anchor()) {
            self.scroll = position;
        }
    }

    /// Handle a key action.
    pub fn handle_action(&mut self, action: KeyAction, viewport_height: usize, now: Instant) {
        if action.is_scroll() {
            super::scroll_handler::handle_scroll_action(self, action, viewport_height);
            return;
        }

        match action {
            KeyAction::LoadPrevious => {
                self.stream.load_previous(now);
            }
            KeyAction::ToggleEventClass(index) => {
                if let Some(kind) = EventKind::known().get(index).cloned() {
                    let filter = self.stream.filter().with_event_toggled(kind);
                    self.change_filter(filter, now);
                }
            }
            KeyAction::ClearEventFilter => {
                let filter = self.stream.filter().with_events_cleared();
                self.change_filter(filter, now);
            }
            KeyAction::CycleLink => {
                let next = self.catalog.next_after(self.stream.filter().link());
                let filter = self.stream.filter().with_link(next);
                self.change_filter(filter, now);
            }
            KeyAction::RefreshStatus => self.status.request_refresh(now),
            KeyAction::Quit => self.should_quit = true,
            KeyAction::ScrollUp
            | KeyAction::ScrollDown
            | KeyAction::PageUp
            | KeyAction::PageDown
            | KeyAction::ScrollToTop
            | KeyAction::ScrollToBottom => {}
        }
    }

    fn change_filter(&mut self, filter: FilterState, now: Instant) {
        let description = filter.describe();
        if self.stream.set_filter(filter, now) {
            info!(filter = %description, "filter changed");
            self.apply_anchor();
        }
    }

    /// Whether the table shows a pagination row above the records.
    pub fn shows_pagination_row(&self) -> bool {
        self.stream.can_load_previous() || self.stream.is_loading_previous()
    }

    /// Table rows: records plus the optional pagination row.
    pub fn table_rows(&self) -> usize {
        self.stream.window().len() + usize::from(self.shows_pagination_row())
    }
}
