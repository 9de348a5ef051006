//! Event log records as served by `GET /events`.

use super::detail::{DetailRegistry, EventDetail};
use super::link::{is_endpoint, LinkKey};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Server-assigned sequence number of a log record.
///
/// Strictly increasing and unique across the whole log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sn(u64);

impl Sn {
    /// Wrap a raw sequence number.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw sequence number.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Sn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Event class tag of a record.
///
/// The monitor backend emits the four known classes; anything else is kept verbatim
/// so a newer backend does not break the viewer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// Monitor lifecycle or free-form message.
    Log,
    /// Messages sent on a link.
    Tx,
    /// Messages received on a link.
    Rx,
    /// Link state transition.
    State,
    /// Unrecognised tag.
    Other(String),
}

impl EventKind {
    /// The fixed enumeration offered by the event-class filter, in display order.
    pub fn known() -> [EventKind; 4] {
        [EventKind::Log, EventKind::Tx, EventKind::Rx, EventKind::State]
    }

    /// Wire tag.
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Log => "log",
            EventKind::Tx => "tx",
            EventKind::Rx => "rx",
            EventKind::State => "state",
            EventKind::Other(tag) => tag,
        }
    }
}

impl From<&str> for EventKind {
    fn from(tag: &str) -> Self {
        match tag {
            "log" => EventKind::Log,
            "tx" => EventKind::Tx,
            "rx" => EventKind::Rx,
            "state" => EventKind::State,
            other => EventKind::Other(other.to_string()),
        }
    }
}

impl From<String> for EventKind {
    fn from(tag: String) -> Self {
        EventKind::from(tag.as_str())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the append-only event log.
///
/// Immutable once received. `extra` is kept in its serialized form and decoded
/// lazily by [`LogRecord::detail`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Sequence number (primary key).
    pub sn: Sn,
    /// Unix timestamp in seconds.
    pub ts: f64,
    /// Event class.
    pub event: EventKind,
    /// Source network id, `-` or absent for events without a link.
    #[serde(default)]
    pub src: Option<String>,
    /// Destination network id.
    #[serde(default)]
    pub dst: Option<String>,
    /// Source network display name.
    #[serde(default)]
    pub src_name: Option<String>,
    /// Destination network display name.
    #[serde(default)]
    pub dst_name: Option<String>,
    /// Serialized event payload.
    #[serde(default, deserialize_with = "extra_as_text")]
    pub extra: String,
}

/// The backend stores `extra` as JSON text; tolerate structured payloads too.
fn extra_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    })
}

impl LogRecord {
    /// `src:dst` identity of the record's link, or `None` for link-less events.
    pub fn link_id(&self) -> Option<String> {
        self.link_key().map(|key| key.id())
    }

    /// Typed link identity, or `None` if either endpoint is missing.
    pub fn link_key(&self) -> Option<LinkKey> {
        if !is_endpoint(self.src.as_deref()) || !is_endpoint(self.dst.as_deref()) {
            return None;
        }
        LinkKey::new(self.src.clone()?, self.dst.clone()?).ok()
    }

    /// `src_name→dst_name` display label.
    pub fn link_label(&self) -> String {
        format!(
            "{}→{}",
            self.src_name.as_deref().unwrap_or_default(),
            self.dst_name.as_deref().unwrap_or_default()
        )
    }

    /// Decoded payload using the standard detail registry.
    pub fn detail(&self) -> EventDetail {
        DetailRegistry::standard().parse(&self.event, &self.extra)
    }

    /// Record time in UTC, if `ts` is a representable instant.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        if !self.ts.is_finite() {
            return None;
        }
        let secs = self.ts.floor();
        let nanos = ((self.ts - secs) * 1e9).clamp(0.0, 999_999_999.0) as u32;
        DateTime::from_timestamp(secs as i64, nanos)
    }

    /// Record time rendered in the local time zone.
    pub fn local_time_label(&self) -> String {
        match self.timestamp() {
            Some(ts) => ts
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            None => "-".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_json(src: &str, dst: &str) -> String {
        format!(
            r#"{{"sn":7,"ts":1700000000.25,"event":"tx","src":{src},"dst":{dst},
            "src_name":"ICON","dst_name":"Sepolia","extra":"{{\"count\": 3}}"}}"#
        )
    }

    #[test]
    fn deserializes_backend_row() {
        let record: LogRecord =
            serde_json::from_str(&record_json("\"0x7.icon\"", "\"0xaa36a7.eth2\"")).unwrap();
        assert_eq!(record.sn, Sn::new(7));
        assert_eq!(record.event, EventKind::Tx);
        assert_eq!(record.extra, r#"{"count": 3}"#);
    }

    #[test]
    fn link_id_joins_endpoints() {
        let record: LogRecord =
            serde_json::from_str(&record_json("\"0x7.icon\"", "\"0xaa36a7.eth2\"")).unwrap();
        assert_eq!(record.link_id(), Some("0x7.icon:0xaa36a7.eth2".to_string()));
        assert_eq!(record.link_label(), "ICON→Sepolia");
    }

    #[test]
    fn link_id_is_none_for_placeholder_or_null() {
        let record: LogRecord = serde_json::from_str(&record_json("\"-\"", "\"-\"")).unwrap();
        assert_eq!(record.link_id(), None);

        let record: LogRecord = serde_json::from_str(&record_json("null", "\"x\"")).unwrap();
        assert_eq!(record.link_id(), None);
    }

    #[test]
    fn structured_extra_is_kept_as_text() {
        let json = r#"{"sn":1,"ts":0,"event":"state","extra":{"after":"bad","before":"good"}}"#;
        let record: LogRecord = serde_json::from_str(json).unwrap();
        assert!(record.extra.contains("\"after\":\"bad\""));
        assert_eq!(record.src, None);
    }

    #[test]
    fn unknown_event_kind_round_trips_tag() {
        let kind = EventKind::from("relay_fee");
        assert_eq!(kind, EventKind::Other("relay_fee".to_string()));
        assert_eq!(kind.as_str(), "relay_fee");
    }

    #[test]
    fn timestamp_converts_fractional_seconds() {
        let json = r#"{"sn":1,"ts":1700000000.5,"event":"log","extra":"\"START\""}"#;
        let record: LogRecord = serde_json::from_str(json).unwrap();
        let ts = record.timestamp().unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
        assert_eq!(ts.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn non_finite_timestamp_renders_placeholder() {
        let mut record: LogRecord =
            serde_json::from_str(r#"{"sn":1,"ts":0,"event":"log"}"#).unwrap();
        record.ts = f64::NAN;
        assert_eq!(record.timestamp(), None);
        assert_eq!(record.local_time_label(), "-");
    }
}
