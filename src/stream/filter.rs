//! Event-class and link selection applied at the server.

use crate::model::{EventKind, LinkKey};
use std::collections::BTreeSet;

/// Current selection of which records the window shows.
///
/// The two facets combine by AND. An empty class set means "server default",
/// not "nothing". Values are replaced wholesale; the stream compares them
/// structurally to detect a change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterState {
    event_classes: BTreeSet<EventKind>,
    link: Option<LinkKey>,
}

impl FilterState {
    /// Build a filter from explicit facets.
    pub fn new(event_classes: impl IntoIterator<Item = EventKind>, link: Option<LinkKey>) -> Self {
        Self {
            event_classes: event_classes.into_iter().collect(),
            link,
        }
    }

    /// Selected event classes; empty means server default.
    pub fn event_classes(&self) -> &BTreeSet<EventKind> {
        &self.event_classes
    }

    /// Selected link direction, if any.
    pub fn link(&self) -> Option<&LinkKey> {
        self.link.as_ref()
    }

    /// Whether no facet narrows the server default.
    pub fn is_default(&self) -> bool {
        self.event_classes.is_empty() && self.link.is_none()
    }

    /// Whether `kind` is explicitly selected.
    pub fn includes(&self, kind: &EventKind) -> bool {
        self.event_classes.contains(kind)
    }

    /// Copy with `kind` added or removed.
    pub fn with_event_toggled(&self, kind: EventKind) -> Self {
        let mut next = self.clone();
        if !next.event_classes.remove(&kind) {
            next.event_classes.insert(kind);
        }
        next
    }

    /// Copy with the class facet reset to the server default.
    pub fn with_events_cleared(&self) -> Self {
        Self {
            event_classes: BTreeSet::new(),
            link: self.link.clone(),
        }
    }

    /// Copy with a different link selector.
    pub fn with_link(&self, link: Option<LinkKey>) -> Self {
        Self {
            event_classes: self.event_classes.clone(),
            link,
        }
    }

    /// Comma-separated `events` query value, or `None` for the server default.
    pub fn events_param(&self) -> Option<String> {
        if self.event_classes.is_empty() {
            return None;
        }
        Some(
            self.event_classes
                .iter()
                .map(EventKind::as_str)
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    /// Human-readable summary for the status bar.
    pub fn describe(&self) -> String {
        let events = self.events_param().unwrap_or_else(|| "default".to_string());
        match &self.link {
            Some(link) => format!("events={events} link={link}"),
            None => format!("events={events} link=all"),
        }
    }
}
