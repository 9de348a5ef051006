//! The event stream controller.
//!
//! [`EventStream`] owns the window, the filter, the scheduler and the anchor,
//! and is the only place where fetch results are merged. It is transport
//! agnostic: [`EventStream::poll`] hands out a [`FetchTicket`] describing the
//! request to make, and [`EventStream::complete`] consumes its result. The
//! shell runs tickets on a worker thread; tests can use [`EventStream::drive`]
//! with an in-memory gateway.
//!
//! # Cycle selection
//!
//! On each due cycle exactly one mode is chosen, in priority order:
//!
//! 1. The filter differs from the one the previous cycle used: discard the
//!    window and backlog, fetch `Initial`.
//! 2. The window is empty: `Initial`.
//! 3. A backlog target lies below the window's first `sn`:
//!    `Before(first, min(page_limit, first - target))`.
//! 4. Otherwise `After(last)`.
//!
//! # Generations
//!
//! Every filter change bumps a generation counter and each ticket carries the
//! generation it was issued under. A completion from an older generation is
//! discarded and the next cycle runs immediately.

use super::anchor::{AnchorHint, ScrollAnchor};
use super::filter::FilterState;
use super::scheduler::{CycleState, Pace, PollScheduler, RequestId, StreamPolicy};
use super::window::{Range, WindowStore};
use crate::gateway::{FetchGateway, PageSpec};
use crate::model::{FetchError, LogRecord, Sn};
use std::time::Instant;
use tracing::{debug, warn};

/// Description of one request the host must execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    /// Request identity for single-flight matching.
    pub id: RequestId,
    /// Filter generation the request was issued under.
    pub generation: u64,
    /// Filter to send.
    pub filter: FilterState,
    /// Page to request.
    pub page: PageSpec,
}

/// What a completion did to the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Initial page installed.
    Replaced,
    /// Older records placed before the window.
    Prepended,
    /// Newer records placed after the window.
    Appended,
    /// Nothing new at the live edge.
    CaughtUp,
    /// No older records exist.
    FloorReached,
    /// The request failed; the window is untouched.
    Failed,
    /// Issued under an older filter generation; discarded.
    Stale,
    /// Not the outstanding request; ignored.
    Ignored,
}

/// Coarse liveness of the stream, for indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamHealth {
    /// No fetch has completed yet under the current filter.
    Starting,
    /// The last fetch brought new records; more may follow.
    CatchingUp,
    /// Nothing new to fetch; polling on the slow interval.
    Live,
    /// The last fetch failed; retrying on the slow interval.
    Retrying,
}

/// Streaming and pagination engine for one filtered view of the event log.
#[derive(Debug)]
pub struct EventStream {
    filter: FilterState,
    applied_filter: Option<FilterState>,
    generation: u64,
    window: WindowStore,
    scheduler: PollScheduler,
    anchor: ScrollAnchor,
    in_flight: Option<FetchTicket>,
    health: StreamHealth,
    last_failure: Option<FetchError>,
}

impl EventStream {
    /// A stopped stream with an empty window.
    pub fn new(filter: FilterState, policy: StreamPolicy) -> Self {
        Self {
            filter,
            applied_filter: None,
            generation: 0,
            window: WindowStore::new(),
            scheduler: PollScheduler::new(policy),
            anchor: ScrollAnchor::default(),
            in_flight: None,
            health: StreamHealth::Starting,
            last_failure: None,
        }
    }

    /// Make the first cycle due at `now`. Has no effect once started.
    pub fn start(&mut self, now: Instant) {
        if self.scheduler.state() == CycleState::Idle {
            self.scheduler.wake_now(now);
        }
    }

    /// Run the next cycle as soon as possible.
    pub fn wake(&mut self, now: Instant) {
        self.scheduler.wake_now(now);
    }

    /// Start a cycle if one is due and return the request to perform.
    pub fn poll(&mut self, now: Instant) -> Option<FetchTicket> {
        let id = self.scheduler.begin(now)?;
        let page = self.select_page();
        let ticket = FetchTicket {
            id,
            generation: self.generation,
            filter: self.filter.clone(),
            page,
        };
        debug!(
            request = id.get(),
            generation = self.generation,
            mode = page.mode(),
            ?page,
            "fetch cycle started"
        );
        self.in_flight = Some(ticket.clone());
        Some(ticket)
    }

    fn select_page(&mut self) -> PageSpec {
        if self.applied_filter.as_ref() != Some(&self.filter) {
            self.window.clear();
            self.scheduler.reset_backlog();
            self.applied_filter = Some(self.filter.clone());
            return PageSpec::Initial;
        }

        let Some(range) = self.window.range() else {
            return PageSpec::Initial;
        };

        match self.scheduler.backlog_target() {
            Some(target) if target < range.first => {
                let missing = range.first.get() - target.get();
                let limit = missing.min(u64::from(self.scheduler.policy().page_limit())) as u32;
                PageSpec::Before {
                    boundary: range.first,
                    limit,
                }
            }
            _ => PageSpec::After {
                boundary: range.last,
            },
        }
    }

    /// Merge the result of `ticket` and schedule the next cycle.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<LogRecord>, FetchError>,
        now: Instant,
    ) -> CycleOutcome {
        if !self.scheduler.is_current(ticket.id) {
            debug!(request = ticket.id.get(), "ignoring completion of unknown request");
            return CycleOutcome::Ignored;
        }
        self.in_flight = None;

        if ticket.generation != self.generation {
            debug!(
                request = ticket.id.get(),
                issued = ticket.generation,
                current = self.generation,
                "discarding stale completion"
            );
            self.scheduler.finish(ticket.id, now, Pace::Now);
            return CycleOutcome::Stale;
        }

        let batch = match result {
            Ok(batch) => batch,
            Err(error) => {
                warn!(
                    mode = ticket.page.mode(),
                    transport = error.is_transport(),
                    %error,
                    "event fetch failed"
                );
                self.last_failure = Some(error);
                self.health = StreamHealth::Retrying;
                self.scheduler.finish(ticket.id, now, Pace::Slow);
                return CycleOutcome::Failed;
            }
        };
        self.last_failure = None;

        let received = batch.len();
        let (outcome, pace) = self.merge(ticket.page, batch);
        debug!(
            request = ticket.id.get(),
            received,
            ?outcome,
            range = ?self.window.range(),
            "fetch cycle finished"
        );
        self.scheduler.finish(ticket.id, now, pace);
        outcome
    }

    fn merge(&mut self, page: PageSpec, batch: Vec<LogRecord>) -> (CycleOutcome, Pace) {
        match page {
            PageSpec::Initial if batch.is_empty() => {
                self.health = StreamHealth::Live;
                (CycleOutcome::CaughtUp, Pace::Slow)
            }
            PageSpec::Initial => {
                self.window.replace(batch);
                self.anchor.signal(AnchorHint::Bottom);
                self.health = StreamHealth::CatchingUp;
                (CycleOutcome::Replaced, Pace::Fast)
            }
            PageSpec::Before { .. } if batch.is_empty() => {
                self.scheduler.mark_floor();
                self.health = StreamHealth::Live;
                (CycleOutcome::FloorReached, Pace::Slow)
            }
            PageSpec::Before { .. } => {
                self.window.prepend(batch);
                self.anchor.signal(AnchorHint::Top);
                self.health = StreamHealth::CatchingUp;
                if let (Some(target), Some(range)) =
                    (self.scheduler.backlog_target(), self.window.range())
                {
                    if range.first <= target {
                        self.scheduler.set_backlog_target(None);
                    }
                }
                (CycleOutcome::Prepended, Pace::Fast)
            }
            PageSpec::After { .. } if batch.is_empty() => {
                self.health = StreamHealth::Live;
                (CycleOutcome::CaughtUp, Pace::Slow)
            }
            PageSpec::After { .. } => {
                self.window.append(batch);
                self.anchor.signal(AnchorHint::Bottom);
                self.health = StreamHealth::CatchingUp;
                (CycleOutcome::Appended, Pace::Fast)
            }
        }
    }

    /// Replace the filter.
    ///
    /// A structurally equal filter is a no-op. Otherwise the window and the
    /// backlog request are discarded, the generation advances and the next
    /// cycle (an `Initial` fetch) becomes due immediately, or right after the
    /// outstanding request.
    pub fn set_filter(&mut self, filter: FilterState, now: Instant) -> bool {
        if filter == self.filter {
            return false;
        }
        debug!(from = %self.filter.describe(), to = %filter.describe(), "filter changed");
        self.filter = filter;
        self.generation += 1;
        self.window.clear();
        self.scheduler.reset_backlog();
        self.anchor.signal(AnchorHint::Bottom);
        self.health = StreamHealth::Starting;
        self.scheduler.wake_now(now);
        true
    }

    /// Ask for history back to `target` (clamped to at least 1).
    ///
    /// Returns `false` if the floor has been reached, the window is empty, or
    /// the window already starts at or below `target`.
    pub fn request_backlog(&mut self, target: Sn, now: Instant) -> bool {
        if self.scheduler.floor_reached() {
            return false;
        }
        let Some(range) = self.window.range() else {
            return false;
        };
        let target = Sn::new(target.get().max(1));
        if target >= range.first {
            return false;
        }
        debug!(%target, first = %range.first, "backlog requested");
        self.scheduler.set_backlog_target(Some(target));
        self.scheduler.wake_now(now);
        true
    }

    /// Move the backlog target one step further back.
    pub fn load_previous(&mut self, now: Instant) -> bool {
        if !self.can_load_previous() {
            return false;
        }
        let Some(range) = self.window.range() else {
            return false;
        };
        let base = self
            .scheduler
            .backlog_target()
            .map_or(range.first, |target| target.min(range.first));
        let target = base
            .get()
            .saturating_sub(self.scheduler.policy().step())
            .max(1);
        self.request_backlog(Sn::new(target), now)
    }

    /// Whether older records may exist and can be requested.
    pub fn can_load_previous(&self) -> bool {
        match self.window.range() {
            Some(range) => range.first.get() > 1 && !self.scheduler.floor_reached(),
            None => false,
        }
    }

    /// Whether a backlog request is outstanding.
    pub fn is_loading_previous(&self) -> bool {
        match (self.scheduler.backlog_target(), self.window.range()) {
            (Some(target), Some(range)) => target < range.first,
            _ => false,
        }
    }

    /// Synchronously run one due cycle against `gateway`.
    pub fn drive<G: FetchGateway + ?Sized>(
        &mut self,
        gateway: &G,
        now: Instant,
    ) -> Option<CycleOutcome> {
        let ticket = self.poll(now)?;
        let result = gateway.fetch_events(&ticket.filter, ticket.page);
        Some(self.complete(&ticket, result, now))
    }

    /// Consume the pending scroll hint.
    pub fn take_anchor(&mut self) -> AnchorHint {
        self.anchor.take()
    }

    /// Materialized records, oldest first.
    pub fn window(&self) -> &WindowStore {
        &self.window
    }

    /// Covered range, `None` when empty.
    pub fn range(&self) -> Option<Range> {
        self.window.range()
    }

    /// Active filter.
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Current filter generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The outstanding request, if any.
    pub fn in_flight(&self) -> Option<&FetchTicket> {
        self.in_flight.as_ref()
    }

    /// When the next cycle is due (`None` while fetching or stopped).
    pub fn next_wake(&self) -> Option<Instant> {
        self.scheduler.next_wake()
    }

    /// Start instant of the latest cycle.
    pub fn last_trigger(&self) -> Option<Instant> {
        self.scheduler.last_trigger()
    }

    /// Outstanding backlog target.
    pub fn backlog_target(&self) -> Option<Sn> {
        self.scheduler.backlog_target()
    }

    /// Whether the oldest record has been reached.
    pub fn floor_reached(&self) -> bool {
        self.scheduler.floor_reached()
    }

    /// Stream liveness.
    pub fn health(&self) -> StreamHealth {
        self.health
    }

    /// Failure of the latest cycle, cleared by the next success.
    pub fn last_failure(&self) -> Option<&FetchError> {
        self.last_failure.as_ref()
    }

    /// Active policy.
    pub fn policy(&self) -> &StreamPolicy {
        self.scheduler.policy()
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
