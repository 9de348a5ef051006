//! Single-flight poll timer and backlog bookkeeping.
//!
//! The scheduler never performs I/O and never reads the clock: every entry
//! point takes the current `Instant`, so the host loop owns time and tests can
//! drive it deterministically.

use crate::gateway::MAX_BEFORE_LIMIT;
use crate::model::Sn;
use std::time::{Duration, Instant};

/// Tunable timing and paging parameters of the stream engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamPolicy {
    /// Delay before the next cycle after a productive fetch.
    pub fast_interval: Duration,
    /// Delay before the next cycle when caught up or after a failure.
    pub slow_interval: Duration,
    /// Page size for `before` queries. Clamped to `1..=100`.
    pub backlog_page_limit: u32,
    /// How far one "load previous" moves the backlog target.
    pub load_previous_step: u64,
}

impl Default for StreamPolicy {
    fn default() -> Self {
        Self {
            fast_interval: Duration::from_millis(200),
            slow_interval: Duration::from_secs(10),
            backlog_page_limit: MAX_BEFORE_LIMIT,
            load_previous_step: 100,
        }
    }
}

impl StreamPolicy {
    /// Effective `before` page size.
    pub fn page_limit(&self) -> u32 {
        self.backlog_page_limit.clamp(1, MAX_BEFORE_LIMIT)
    }

    /// Effective "load previous" step (at least one record).
    pub fn step(&self) -> u64 {
        self.load_previous_step.max(1)
    }
}

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Where the fetch cycle is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// Not started.
    Idle,
    /// Next cycle may start at `at`.
    Scheduled {
        /// Due instant.
        at: Instant,
    },
    /// A request is outstanding; no other cycle may start.
    Fetching {
        /// The outstanding request.
        request: RequestId,
    },
}

/// How soon the cycle after a completion should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// Immediately (a trigger is pending).
    Now,
    /// After the fast interval (more data is likely).
    Fast,
    /// After the slow interval (caught up, floor reached or failure).
    Slow,
}

/// Single-flight timer state machine.
///
/// `Idle -> Scheduled -> Fetching -> Scheduled -> ...`. Triggers that arrive
/// while `Fetching` are remembered and turn the following wake into an
/// immediate one.
#[derive(Debug, Clone)]
pub struct PollScheduler {
    policy: StreamPolicy,
    state: CycleState,
    next_request: u64,
    retrigger: bool,
    last_trigger: Option<Instant>,
    backlog_target: Option<Sn>,
    floor_reached: bool,
}

impl PollScheduler {
    /// A scheduler in `Idle`.
    pub fn new(policy: StreamPolicy) -> Self {
        Self {
            policy,
            state: CycleState::Idle,
            next_request: 0,
            retrigger: false,
            last_trigger: None,
            backlog_target: None,
            floor_reached: false,
        }
    }

    /// Active policy.
    pub fn policy(&self) -> &StreamPolicy {
        &self.policy
    }

    /// Current cycle state.
    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Whether a request is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, CycleState::Fetching { .. })
    }

    /// Whether `request` is the outstanding one.
    pub fn is_current(&self, request: RequestId) -> bool {
        self.state == CycleState::Fetching { request }
    }

    /// Make the next cycle due now, or right after the outstanding request.
    pub fn wake_now(&mut self, now: Instant) {
        match self.state {
            CycleState::Fetching { .. } => self.retrigger = true,
            CycleState::Idle | CycleState::Scheduled { .. } => {
                self.state = CycleState::Scheduled { at: now }
            }
        }
    }

    /// Whether a cycle may start at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.state, CycleState::Scheduled { at } if at <= now)
    }

    /// Start a cycle if one is due. Returns the id of the new request.
    pub fn begin(&mut self, now: Instant) -> Option<RequestId> {
        if !self.is_due(now) {
            return None;
        }
        self.next_request += 1;
        let request = RequestId(self.next_request);
        self.state = CycleState::Fetching { request };
        self.last_trigger = Some(now);
        Some(request)
    }

    /// Finish the outstanding request and schedule the next cycle.
    ///
    /// Returns `false` (and changes nothing) if `request` is not outstanding.
    pub fn finish(&mut self, request: RequestId, now: Instant, pace: Pace) -> bool {
        if !self.is_current(request) {
            return false;
        }
        let pace = if std::mem::take(&mut self.retrigger) {
            Pace::Now
        } else {
            pace
        };
        let delay = match pace {
            Pace::Now => Duration::ZERO,
            Pace::Fast => self.policy.fast_interval,
            Pace::Slow => self.policy.slow_interval,
        };
        self.state = CycleState::Scheduled { at: now + delay };
        true
    }

    /// When the next cycle is due; `None` while idle or fetching.
    pub fn next_wake(&self) -> Option<Instant> {
        match self.state {
            CycleState::Scheduled { at } => Some(at),
            CycleState::Idle | CycleState::Fetching { .. } => None,
        }
    }

    /// Start instant of the latest cycle.
    pub fn last_trigger(&self) -> Option<Instant> {
        self.last_trigger
    }

    /// Oldest `sn` the user asked to see, if still outstanding.
    pub fn backlog_target(&self) -> Option<Sn> {
        self.backlog_target
    }

    /// Set or clear the backlog target.
    pub fn set_backlog_target(&mut self, target: Option<Sn>) {
        self.backlog_target = target;
    }

    /// Whether a `before` query has come back empty since the last reset.
    pub fn floor_reached(&self) -> bool {
        self.floor_reached
    }

    /// No older records exist: drop the backlog request and remember the floor.
    pub fn mark_floor(&mut self) {
        self.backlog_target = None;
        self.floor_reached = true;
    }

    /// Forget backlog target and floor (filter reset).
    pub fn reset_backlog(&mut self) {
        self.backlog_target = None;
        self.floor_reached = false;
    }
}
