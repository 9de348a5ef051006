//! Shared fixtures for integration tests.

#![allow(dead_code)] // Not every test binary uses every helper

use btp_monitor::gateway::{FetchGateway, PageSpec};
use btp_monitor::model::{EventKind, FetchError, LinkInfo, LinkKey, LinkSummary, LogRecord, Sn};
use btp_monitor::stream::FilterState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Classes assigned round-robin by [`ScriptedLog::with_range`].
pub const CLASS_CYCLE: [EventKind; 4] = [
    EventKind::Log,
    EventKind::Tx,
    EventKind::Rx,
    EventKind::State,
];

pub fn record(sn: u64, event: EventKind) -> LogRecord {
    LogRecord {
        sn: Sn::new(sn),
        ts: 1_700_000_000.0 + sn as f64,
        event,
        src: Some("0x7.icon".to_string()),
        dst: Some("0x1.eth".to_string()),
        src_name: Some("ICON".to_string()),
        dst_name: Some("Sepolia".to_string()),
        extra: r#"{"count": 1}"#.to_string(),
    }
}

#[derive(Debug)]
struct Inner {
    records: Mutex<Vec<LogRecord>>,
    requests: Mutex<Vec<PageSpec>>,
    failing: AtomicBool,
    initial_page: usize,
    page_size: usize,
}

/// In-memory event log honouring the `/events` contract.
///
/// `Initial` returns the newest `initial_page` records, `Before` the newest
/// `min(limit, page_size)` records below the boundary (both descending), and
/// `After` the oldest `page_size` records above the boundary (ascending).
/// Clones share the same log, so one copy can be handed to a worker thread.
#[derive(Debug, Clone)]
pub struct ScriptedLog {
    inner: Arc<Inner>,
}

impl ScriptedLog {
    /// Log holding `first..=last`, classes cycling through [`CLASS_CYCLE`].
    pub fn with_range(first: u64, last: u64) -> Self {
        Self::build(first, last, 100, 100)
    }

    /// Like [`ScriptedLog::with_range`] with custom page sizes.
    pub fn with_pages(first: u64, last: u64, initial_page: usize, page_size: usize) -> Self {
        Self::build(first, last, initial_page, page_size)
    }

    fn build(first: u64, last: u64, initial_page: usize, page_size: usize) -> Self {
        let records = (first..=last)
            .map(|sn| record(sn, CLASS_CYCLE[(sn % 4) as usize].clone()))
            .collect();
        Self {
            inner: Arc::new(Inner {
                records: Mutex::new(records),
                requests: Mutex::new(Vec::new()),
                failing: AtomicBool::new(false),
                initial_page,
                page_size,
            }),
        }
    }

    /// Append records `from..=to` (all `tx`).
    pub fn extend(&self, from: u64, to: u64) {
        let mut records = self.inner.records.lock().unwrap();
        records.extend((from..=to).map(|sn| record(sn, EventKind::Tx)));
    }

    pub fn last_sn(&self) -> u64 {
        let records = self.inner.records.lock().unwrap();
        records.last().map_or(0, |r| r.sn.get())
    }

    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<PageSpec> {
        self.inner.requests.lock().unwrap().clone()
    }

    pub fn clear_requests(&self) {
        self.inner.requests.lock().unwrap().clear();
    }

    /// Sequence numbers visible under `filter`, ascending.
    pub fn visible(&self, filter: &FilterState) -> Vec<u64> {
        let records = self.inner.records.lock().unwrap();
        records
            .iter()
            .filter(|r| matches(filter, r))
            .map(|r| r.sn.get())
            .collect()
    }
}

fn matches(filter: &FilterState, record: &LogRecord) -> bool {
    let class = filter.event_classes().is_empty() || filter.includes(&record.event);
    let link = match filter.link() {
        Some(link) => record.link_key().as_ref() == Some(link),
        None => true,
    };
    class && link
}

impl FetchGateway for ScriptedLog {
    fn fetch_events(
        &self,
        filter: &FilterState,
        page: PageSpec,
    ) -> Result<Vec<LogRecord>, FetchError> {
        self.inner.requests.lock().unwrap().push(page);
        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(FetchError::Transport {
                url: "http://scripted/events".to_string(),
                reason: "connection refused".to_string(),
            });
        }

        let records = self.inner.records.lock().unwrap();
        let visible = records.iter().filter(|r| matches(filter, r));
        Ok(match page {
            PageSpec::Initial => visible
                .rev()
                .take(self.inner.initial_page)
                .cloned()
                .collect(),
            PageSpec::Before { boundary, limit } => visible
                .filter(|r| r.sn < boundary)
                .rev()
                .take((limit as usize).min(self.inner.page_size))
                .cloned()
                .collect(),
            PageSpec::After { boundary } => visible
                .filter(|r| r.sn > boundary)
                .take(self.inner.page_size)
                .cloned()
                .collect(),
        })
    }

    fn fetch_links(&self) -> Result<Vec<LinkSummary>, FetchError> {
        Ok(vec![LinkSummary {
            src: "0x7.icon".to_string(),
            dst: "0x1.eth".to_string(),
            src_name: Some("ICON".to_string()),
            dst_name: Some("Sepolia".to_string()),
        }])
    }

    fn fetch_link_info(&self, link: &LinkKey) -> Result<LinkInfo, FetchError> {
        Ok(LinkInfo {
            src: link.src().to_string(),
            dst: link.dst().to_string(),
            src_name: None,
            dst_name: None,
            state: "good".to_string(),
            tx_seq: Some(5),
            rx_seq: Some(4),
            tx_height: Some(1200),
            rx_height: Some(1190),
            pending_count: Some(1),
            pending_delay: Some(12.0),
            time_limit: Some(600),
        })
    }

    fn fetch_version(&self) -> Result<String, FetchError> {
        Ok("scripted".to_string())
    }
}
