//! Periodic link status refresh.
//!
//! A refresh round lists the links, then requests a snapshot for every known
//! direction. Only one round runs at a time; the next one is scheduled
//! `interval` after the previous round finished, or immediately if a refresh
//! was requested meanwhile. A failed request keeps the previous snapshot for
//! that link.

use crate::gateway::{Completion, Job};
use crate::model::{FetchError, LinkInfo, LinkKey};
use crate::stream::LinkCatalog;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Link status snapshots plus the refresh schedule.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    interval: Duration,
    next_due: Option<Instant>,
    in_round: bool,
    refresh_requested: bool,
    pending: usize,
    snapshots: BTreeMap<LinkKey, LinkInfo>,
    version: Option<String>,
    last_error: Option<FetchError>,
    last_update: Option<Instant>,
}

impl StatusBoard {
    /// An idle board refreshing every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
            in_round: false,
            refresh_requested: false,
            pending: 0,
            snapshots: BTreeMap::new(),
            version: None,
            last_error: None,
            last_update: None,
        }
    }

    /// Make the first round due at `now`.
    pub fn start(&mut self, now: Instant) {
        if self.next_due.is_none() && !self.in_round {
            self.next_due = Some(now);
        }
    }

    /// Run a round as soon as the current one (if any) finishes.
    pub fn request_refresh(&mut self, now: Instant) {
        if self.in_round {
            self.refresh_requested = true;
        } else {
            self.next_due = Some(now);
        }
    }

    /// Jobs to submit if a round is due at `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<Job> {
        if self.in_round || !self.next_due.is_some_and(|at| at <= now) {
            return Vec::new();
        }
        self.in_round = true;
        self.pending = 1;
        self.next_due = None;

        let mut jobs = vec![Job::Links];
        if self.version.is_none() {
            jobs.push(Job::Version);
        }
        jobs
    }

    /// Apply a finished job. Returns follow-up jobs for the same round.
    ///
    /// Event completions are not handled here and yield nothing.
    pub fn apply(
        &mut self,
        completion: Completion,
        catalog: &mut LinkCatalog,
        now: Instant,
    ) -> Vec<Job> {
        match completion {
            Completion::Links(Ok(links)) => {
                self.last_error = None;
                catalog.set_listed(&links);
                let jobs: Vec<Job> = catalog.connections().cloned().map(Job::LinkInfo).collect();
                debug!(links = jobs.len(), "refreshing link status");
                self.pending = jobs.len();
                if jobs.is_empty() {
                    self.finish_round(now);
                }
                jobs
            }
            Completion::Links(Err(error)) => {
                warn!(%error, "link listing failed");
                self.last_error = Some(error);
                self.pending = 0;
                self.finish_round(now);
                Vec::new()
            }
            Completion::LinkInfo { link, result } => {
                match result {
                    Ok(info) => {
                        self.snapshots.insert(link, info);
                    }
                    Err(error) => {
                        warn!(link = %link, %error, "link status fetch failed");
                        self.last_error = Some(error);
                    }
                }
                self.pending = self.pending.saturating_sub(1);
                if self.pending == 0 {
                    self.finish_round(now);
                }
                Vec::new()
            }
            Completion::Version(Ok(version)) => {
                self.version = Some(version);
                Vec::new()
            }
            Completion::Version(Err(error)) => {
                debug!(%error, "version fetch failed");
                Vec::new()
            }
            Completion::Events { .. } => Vec::new(),
        }
    }

    fn finish_round(&mut self, now: Instant) {
        if !self.in_round {
            return;
        }
        self.in_round = false;
        self.last_update = Some(now);
        self.next_due = if std::mem::take(&mut self.refresh_requested) {
            Some(now)
        } else {
            Some(now + self.interval)
        };
    }

    /// Snapshots in link order.
    pub fn snapshots(&self) -> impl Iterator<Item = (&LinkKey, &LinkInfo)> {
        self.snapshots.iter()
    }

    /// Snapshot of one direction.
    pub fn snapshot(&self, link: &LinkKey) -> Option<&LinkInfo> {
        self.snapshots.get(link)
    }

    /// Backend version, once known.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Latest status failure of the current or previous round.
    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// When the last round finished.
    pub fn last_update(&self) -> Option<Instant> {
        self.last_update
    }

    /// When the next round is due (`None` while one is running).
    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Whether a round is running.
    pub fn is_refreshing(&self) -> bool {
        self.in_round
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinkSummary;

    const INTERVAL: Duration = Duration::from_secs(10);

    fn info(src: &str, dst: &str, state: &str) -> LinkInfo {
        LinkInfo {
            src: src.to_string(),
            dst: dst.to_string(),
            src_name: None,
            dst_name: None,
            state: state.to_string(),
            tx_seq: Some(3),
            rx_seq: Some(3),
            tx_height: None,
            rx_height: None,
            pending_count: Some(0),
            pending_delay: None,
            time_limit: None,
        }
    }

    fn listing() -> Completion {
        Completion::Links(Ok(vec![LinkSummary {
            src: "a".to_string(),
            dst: "b".to_string(),
            src_name: None,
            dst_name: None,
        }]))
    }

    fn started(now: Instant) -> StatusBoard {
        let mut board = StatusBoard::new(INTERVAL);
        board.start(now);
        board
    }

    #[test]
    fn first_round_lists_links_and_version() {
        let now = Instant::now();
        let mut board = started(now);
        let jobs = board.poll(now);
        assert!(matches!(jobs.as_slice(), [Job::Links, Job::Version]));
        assert!(board.is_refreshing());
        assert!(board.poll(now).is_empty());
    }

    #[test]
    fn listing_fans_out_to_both_directions() {
        let now = Instant::now();
        let mut board = started(now);
        let mut catalog = LinkCatalog::new();
        board.poll(now);

        let jobs = board.apply(listing(), &mut catalog, now);
        assert_eq!(jobs.len(), 2);
        assert!(board.is_refreshing());
    }

    #[test]
    fn round_finishes_after_all_snapshots() {
        let now = Instant::now();
        let mut board = started(now);
        let mut catalog = LinkCatalog::new();
        board.poll(now);
        board.apply(listing(), &mut catalog, now);

        let ab = LinkKey::new("a", "b").unwrap();
        let ba = ab.reversed();
        board.apply(
            Completion::LinkInfo {
                link: ab.clone(),
                result: Ok(info("a", "b", "good")),
            },
            &mut catalog,
            now,
        );
        assert!(board.is_refreshing());
        board.apply(
            Completion::LinkInfo {
                link: ba,
                result: Ok(info("b", "a", "bad")),
            },
            &mut catalog,
            now,
        );

        assert!(!board.is_refreshing());
        assert_eq!(board.snapshots().count(), 2);
        assert_eq!(board.snapshot(&ab).map(|i| i.state.as_str()), Some("good"));
        assert_eq!(board.next_due(), Some(now + INTERVAL));
        assert_eq!(board.last_update(), Some(now));
    }

    #[test]
    fn failed_snapshot_keeps_previous() {
        let now = Instant::now();
        let mut board = started(now);
        let mut catalog = LinkCatalog::new();
        let ab = LinkKey::new("a", "b").unwrap();
        board.poll(now);
        board.apply(listing(), &mut catalog, now);
        board.apply(
            Completion::LinkInfo {
                link: ab.clone(),
                result: Ok(info("a", "b", "good")),
            },
            &mut catalog,
            now,
        );
        board.apply(
            Completion::LinkInfo {
                link: ab.clone(),
                result: Err(FetchError::Status {
                    url: "http://test/links/a/b".to_string(),
                    status: 500,
                }),
            },
            &mut catalog,
            now,
        );

        assert_eq!(board.snapshot(&ab).map(|i| i.state.as_str()), Some("good"));
        assert!(board.last_error().is_some());
    }

    #[test]
    fn failed_listing_schedules_next_round() {
        let now = Instant::now();
        let mut board = started(now);
        let mut catalog = LinkCatalog::new();
        board.poll(now);

        let jobs = board.apply(
            Completion::Links(Err(FetchError::Transport {
                url: "http://test/links".to_string(),
                reason: "refused".to_string(),
            })),
            &mut catalog,
            now,
        );
        assert!(jobs.is_empty());
        assert!(!board.is_refreshing());
        assert_eq!(board.next_due(), Some(now + INTERVAL));
        assert!(board.last_error().is_some());

        let later = now + INTERVAL;
        board.poll(later);
        board.apply(listing(), &mut catalog, later);
        assert!(board.last_error().is_none());
    }

    #[test]
    fn refresh_during_round_runs_right_after_it() {
        let now = Instant::now();
        let mut board = started(now);
        let mut catalog = LinkCatalog::new();
        board.poll(now);

        board.request_refresh(now);
        assert!(board.is_refreshing());
        assert_eq!(board.next_due(), None);

        let later = now + Duration::from_secs(1);
        board.apply(Completion::Links(Ok(Vec::new())), &mut catalog, later);
        assert!(!board.is_refreshing());
        assert_eq!(board.next_due(), Some(later));

        assert!(matches!(board.poll(later).as_slice(), [Job::Links, ..]));
        board.apply(Completion::Links(Ok(Vec::new())), &mut catalog, later);
        assert_eq!(board.next_due(), Some(later + INTERVAL));
    }

    #[test]
    fn version_is_requested_until_known() {
        let now = Instant::now();
        let mut board = started(now);
        let mut catalog = LinkCatalog::new();
        board.poll(now);
        board.apply(Completion::Version(Ok("1.0.0".to_string())), &mut catalog, now);
        board.apply(Completion::Links(Ok(Vec::new())), &mut catalog, now);
        assert_eq!(board.version(), Some("1.0.0"));

        board.request_refresh(now);
        assert!(matches!(board.poll(now).as_slice(), [Job::Links]));
    }
}
