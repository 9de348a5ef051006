//! Typed event payloads and their per-kind decoders.
//!
//! Each event class has its own payload schema. Decoders are looked up in a
//! [`DetailRegistry`] keyed by the event tag, so supporting a new class means
//! registering one function instead of growing a conditional chain.

use super::record::EventKind;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Decoded payload of one record.
#[derive(Debug, Clone, PartialEq)]
pub enum EventDetail {
    /// Messages sent on the link.
    Tx {
        /// Number of messages.
        count: u64,
    },
    /// Messages received on the link.
    Rx {
        /// Number of messages.
        count: u64,
        /// Seconds between sending and receiving.
        delay: f64,
    },
    /// Link state transition.
    State {
        /// Previous state, when reported.
        before: Option<String>,
        /// New state.
        after: String,
    },
    /// Free-form message (lifecycle logs, unknown classes).
    Message(String),
    /// Payload that is not valid JSON; shown as-is.
    Raw(String),
}

impl EventDetail {
    /// Whether the row belongs to a link and should show the link column.
    pub fn has_link(&self) -> bool {
        matches!(
            self,
            EventDetail::Tx { .. } | EventDetail::Rx { .. } | EventDetail::State { .. }
        )
    }

    /// One-line text for the "extra" column.
    pub fn summary(&self) -> String {
        match self {
            EventDetail::Tx { count } => format!("count={count}"),
            EventDetail::Rx { count, delay } => {
                format!("count={count} delay={}", format_delta(*delay))
            }
            EventDetail::State { after, .. } => after.to_uppercase(),
            EventDetail::Message(text) | EventDetail::Raw(text) => text.clone(),
        }
    }
}

/// Decoder for one event class. Returns `None` when the payload does not match the schema.
pub type DetailDecoder = fn(&Value) -> Option<EventDetail>;

/// Lookup table from event tag to payload decoder.
#[derive(Clone, Default)]
pub struct DetailRegistry {
    decoders: HashMap<String, DetailDecoder>,
}

impl fmt::Debug for DetailRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.decoders.keys().collect();
        tags.sort();
        f.debug_struct("DetailRegistry").field("tags", &tags).finish()
    }
}

impl DetailRegistry {
    /// An empty registry; every payload decodes as a message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with decoders for `tx`, `rx` and `state`.
    pub fn with_standard_decoders() -> Self {
        let mut registry = Self::new();
        registry.register(EventKind::Tx, decode_tx);
        registry.register(EventKind::Rx, decode_rx);
        registry.register(EventKind::State, decode_state);
        registry
    }

    /// Shared standard registry.
    pub fn standard() -> &'static DetailRegistry {
        static STANDARD: OnceLock<DetailRegistry> = OnceLock::new();
        STANDARD.get_or_init(DetailRegistry::with_standard_decoders)
    }

    /// Register (or replace) the decoder for an event class.
    pub fn register(&mut self, kind: EventKind, decoder: DetailDecoder) {
        self.decoders.insert(kind.as_str().to_string(), decoder);
    }

    /// Decode a serialized payload.
    ///
    /// Invalid JSON yields [`EventDetail::Raw`]; a payload that does not fit its
    /// class schema falls back to [`EventDetail::Message`]. Never fails.
    pub fn parse(&self, kind: &EventKind, extra: &str) -> EventDetail {
        let value: Value = match serde_json::from_str(extra) {
            Ok(value) => value,
            Err(_) => return EventDetail::Raw(extra.to_string()),
        };
        self.decoders
            .get(kind.as_str())
            .and_then(|decode| decode(&value))
            .unwrap_or_else(|| EventDetail::Message(message_text(&value)))
    }
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn decode_tx(value: &Value) -> Option<EventDetail> {
    Some(EventDetail::Tx {
        count: value.get("count")?.as_u64()?,
    })
}

fn decode_rx(value: &Value) -> Option<EventDetail> {
    Some(EventDetail::Rx {
        count: value.get("count")?.as_u64()?,
        delay: value.get("delta").and_then(Value::as_f64).unwrap_or(0.0),
    })
}

fn decode_state(value: &Value) -> Option<EventDetail> {
    Some(EventDetail::State {
        before: value
            .get("before")
            .and_then(Value::as_str)
            .map(str::to_string),
        after: value.get("after")?.as_str()?.to_string(),
    })
}

const DELTA_UNITS: [(u64, char); 4] = [(60, 's'), (60, 'm'), (24, 'h'), (0, 'd')];

/// Render a duration in seconds as `1d 2h 3m 4s`, omitting zero components.
///
/// Sign is ignored. Durations under one second are printed as the plain number.
pub fn format_delta(secs: f64) -> String {
    if !secs.is_finite() {
        return "-".to_string();
    }
    let secs = secs.abs();
    if secs < 1.0 {
        return secs.to_string();
    }

    let mut remainder = secs as u64;
    let mut parts = Vec::new();
    for (modulus, unit) in DELTA_UNITS {
        let value = if modulus > 0 {
            let value = remainder % modulus;
            remainder /= modulus;
            value
        } else {
            remainder
        };
        if value > 0 {
            parts.push(format!("{value}{unit}"));
        }
    }
    parts.reverse();
    parts.join(" ")
}
