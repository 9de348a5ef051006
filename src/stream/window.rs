//! The materialized, contiguous window over the event log.

use crate::model::{LinkKey, LogRecord, Sn};
use std::collections::{BTreeSet, VecDeque};
use tracing::warn;

/// Inclusive `sn` bounds of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    /// Oldest held sequence number.
    pub first: Sn,
    /// Newest held sequence number.
    pub last: Sn,
}

/// Ordered record sequence plus the range it covers.
///
/// Records are strictly ascending by `sn`. Batches are trusted to respect the
/// fetch contract (strict-inequality bounds). A merge only compares the page
/// edge with the window edge it joins and logs a mismatch.
#[derive(Debug, Clone, Default)]
pub struct WindowStore {
    records: VecDeque<LogRecord>,
    range: Option<Range>,
}

impl WindowStore {
    /// An empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Held records, oldest first.
    pub fn records(&self) -> &VecDeque<LogRecord> {
        &self.records
    }

    /// Covered range; `None` when empty.
    pub fn range(&self) -> Option<Range> {
        self.range
    }

    /// Number of held records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.records.clear();
        self.range = None;
    }

    /// Discard the window and install a newest-first batch.
    pub fn replace(&mut self, batch: Vec<LogRecord>) {
        self.clear();
        self.prepend(batch);
    }

    /// Place a newest-first batch before the existing records.
    pub fn prepend(&mut self, batch: Vec<LogRecord>) {
        if let (Some(newest), Some(front)) = (batch.first(), self.records.front()) {
            if newest.sn >= front.sn {
                warn!(batch = %newest.sn, first = %front.sn, "backward page overlaps window");
            }
        }
        for record in batch {
            self.records.push_front(record);
        }
        self.refresh_range();
    }

    /// Place an oldest-first batch after the existing records.
    pub fn append(&mut self, batch: Vec<LogRecord>) {
        if let (Some(oldest), Some(back)) = (batch.first(), self.records.back()) {
            if oldest.sn <= back.sn {
                warn!(batch = %oldest.sn, last = %back.sn, "forward page overlaps window");
            }
        }
        self.records.extend(batch);
        self.refresh_range();
    }

    /// Distinct links appearing in held records, sorted.
    pub fn links(&self) -> BTreeSet<LinkKey> {
        self.records.iter().filter_map(LogRecord::link_key).collect()
    }

    fn refresh_range(&mut self) {
        self.range = match (self.records.front(), self.records.back()) {
            (Some(first), Some(last)) => Some(Range {
                first: first.sn,
                last: last.sn,
            }),
            _ => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventKind;

    fn record(sn: u64) -> LogRecord {
        LogRecord {
            sn: Sn::new(sn),
            ts: sn as f64,
            event: EventKind::Log,
            src: None,
            dst: None,
            src_name: None,
            dst_name: None,
            extra: String::new(),
        }
    }

    fn sns(store: &WindowStore) -> Vec<u64> {
        store.records().iter().map(|r| r.sn.get()).collect()
    }

    #[test]
    fn replace_reverses_descending_batch() {
        let mut store = WindowStore::new();
        store.replace(vec![record(100), record(99), record(98)]);
        assert_eq!(sns(&store), vec![98, 99, 100]);
        assert_eq!(
            store.range(),
            Some(Range {
                first: Sn::new(98),
                last: Sn::new(100)
            })
        );
    }

    #[test]
    fn prepend_extends_first() {
        let mut store = WindowStore::new();
        store.replace(vec![record(10), record(9)]);
        store.prepend(vec![record(8), record(7)]);
        assert_eq!(sns(&store), vec![7, 8, 9, 10]);
        assert_eq!(store.range().map(|r| r.first), Some(Sn::new(7)));
    }

    #[test]
    fn append_extends_last() {
        let mut store = WindowStore::new();
        store.replace(vec![record(2), record(1)]);
        store.append(vec![record(3), record(4)]);
        assert_eq!(sns(&store), vec![1, 2, 3, 4]);
        assert_eq!(store.range().map(|r| r.last), Some(Sn::new(4)));
    }

    #[test]
    fn overlapping_page_is_kept_as_served() {
        let mut store = WindowStore::new();
        store.replace(vec![record(5), record(4)]);
        store.append(vec![record(5), record(6)]);
        store.prepend(vec![record(4), record(3)]);
        assert_eq!(sns(&store), vec![3, 4, 4, 5, 5, 6]);
        assert_eq!(
            store.range(),
            Some(Range {
                first: Sn::new(3),
                last: Sn::new(6)
            })
        );
    }

    #[test]
    fn replace_discards_previous_window() {
        let mut store = WindowStore::new();
        store.replace(vec![record(5), record(4)]);
        store.replace(vec![record(50)]);
        assert_eq!(sns(&store), vec![50]);
    }

    #[test]
    fn clear_empties_range() {
        let mut store = WindowStore::new();
        store.replace(vec![record(1)]);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.range(), None);
    }

    #[test]
    fn links_are_distinct_and_sorted() {
        let mut store = WindowStore::new();
        let mut a = record(3);
        a.src = Some("b".to_string());
        a.dst = Some("a".to_string());
        let mut b = record(2);
        b.src = Some("a".to_string());
        b.dst = Some("b".to_string());
        let mut c = record(1);
        c.src = Some("a".to_string());
        c.dst = Some("b".to_string());
        store.replace(vec![a, b, c, record(0)]);

        let links: Vec<String> = store.links().iter().map(LinkKey::id).collect();
        assert_eq!(links, vec!["a:b", "b:a"]);
    }
}
