//! Known links for the link selector and the status panel.

use crate::model::{LinkKey, LinkSummary, LogRecord};
use std::collections::{BTreeSet, HashMap};

/// Links merged from `GET /links` and from records seen in the window.
///
/// Each listed link also contributes its reverse direction. Display names are
/// remembered per network id from whichever source mentioned them.
#[derive(Debug, Clone, Default)]
pub struct LinkCatalog {
    listed: BTreeSet<LinkKey>,
    observed: BTreeSet<LinkKey>,
    names: HashMap<String, String>,
}

impl LinkCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the listed links with a fresh `GET /links` response.
    pub fn set_listed(&mut self, summaries: &[LinkSummary]) {
        self.listed.clear();
        for summary in summaries {
            self.remember_name(&summary.src, summary.src_name.as_deref());
            self.remember_name(&summary.dst, summary.dst_name.as_deref());
            if let Some(key) = summary.key() {
                self.listed.insert(key.reversed());
                self.listed.insert(key);
            }
        }
    }

    /// Record the links and names carried by `records`.
    pub fn observe<'a>(&mut self, records: impl IntoIterator<Item = &'a LogRecord>) {
        for record in records {
            let Some(key) = record.link_key() else {
                continue;
            };
            self.remember_name(key.src(), record.src_name.as_deref());
            self.remember_name(key.dst(), record.dst_name.as_deref());
            self.observed.insert(key);
        }
    }

    fn remember_name(&mut self, id: &str, name: Option<&str>) {
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.names.insert(id.to_string(), name.to_string());
        }
    }

    /// Directions reported by the backend (both ways per listed pair).
    pub fn connections(&self) -> impl Iterator<Item = &LinkKey> {
        self.listed.iter()
    }

    /// Every known link, sorted and unique.
    pub fn links(&self) -> Vec<LinkKey> {
        self.listed.union(&self.observed).cloned().collect()
    }

    /// Display name of a network, falling back to its id.
    pub fn network_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.names.get(id).map_or(id, String::as_str)
    }

    /// `src_name→dst_name` label for a link.
    pub fn label(&self, key: &LinkKey) -> String {
        format!(
            "{}→{}",
            self.network_name(key.src()),
            self.network_name(key.dst())
        )
    }

    /// Next selector value when cycling `all → link₁ → … → linkₙ → all`.
    pub fn next_after(&self, current: Option<&LinkKey>) -> Option<LinkKey> {
        let links = self.links();
        match current {
            None => links.into_iter().next(),
            Some(current) => links.into_iter().find(|key| key > current),
        }
    }
}
