//! Link identity and link status snapshots.

use super::error::InvalidLinkKey;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Placeholder the backend emits for an absent network endpoint.
pub const ENDPOINT_PLACEHOLDER: &str = "-";

/// Whether an endpoint id names a real network.
///
/// `None`, the empty string and the `-` placeholder all mean "no endpoint".
pub fn is_endpoint(id: Option<&str>) -> bool {
    matches!(id, Some(id) if !id.is_empty() && id != ENDPOINT_PLACEHOLDER)
}

/// A directed relay path between two networks.
///
/// Network ids use the backend's `{netloc}-{chain}` form (e.g. `0x7.icon`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkKey {
    src: String,
    dst: String,
}

impl LinkKey {
    /// Smart constructor: both endpoints must be real network ids.
    pub fn new(src: impl Into<String>, dst: impl Into<String>) -> Result<Self, InvalidLinkKey> {
        let src = src.into();
        let dst = dst.into();
        if !is_endpoint(Some(&src)) || !is_endpoint(Some(&dst)) {
            return Err(InvalidLinkKey::EmptyEndpoint(format!("{src}:{dst}")));
        }
        Ok(Self { src, dst })
    }

    /// Source network id.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Destination network id.
    pub fn dst(&self) -> &str {
        &self.dst
    }

    /// The same link travelled in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            src: self.dst.clone(),
            dst: self.src.clone(),
        }
    }

    /// Stable `src:dst` identifier.
    pub fn id(&self) -> String {
        format!("{}:{}", self.src, self.dst)
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.src, self.dst)
    }
}

impl FromStr for LinkKey {
    type Err = InvalidLinkKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (src, dst) = s
            .split_once(':')
            .ok_or_else(|| InvalidLinkKey::MissingSeparator(s.to_string()))?;
        LinkKey::new(src.trim(), dst.trim())
            .map_err(|_| InvalidLinkKey::EmptyEndpoint(s.to_string()))
    }
}

/// One entry of `GET /links`.
///
/// The backend lists each connected pair once; the reverse direction is implied.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkSummary {
    /// Source network id.
    pub src: String,
    /// Destination network id.
    pub dst: String,
    /// Source network display name, when the backend knows it.
    #[serde(default)]
    pub src_name: Option<String>,
    /// Destination network display name.
    #[serde(default)]
    pub dst_name: Option<String>,
}

impl LinkSummary {
    /// Link key for the listed direction, if both endpoints are real.
    pub fn key(&self) -> Option<LinkKey> {
        LinkKey::new(self.src.clone(), self.dst.clone()).ok()
    }
}

/// Health of a link as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// Relaying normally.
    Good,
    /// Relay stalled or failing.
    Bad,
    /// Any other state string.
    Other(String),
}

impl LinkState {
    /// Parse the backend's lowercase state string.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "good" => LinkState::Good,
            "bad" => LinkState::Bad,
            other => LinkState::Other(other.to_string()),
        }
    }

    /// Upper-cased badge text.
    pub fn badge(&self) -> String {
        match self {
            LinkState::Good => "GOOD".to_string(),
            LinkState::Bad => "BAD".to_string(),
            LinkState::Other(s) => s.to_uppercase(),
        }
    }
}

/// Status snapshot of one link direction (`GET /links/{src}/{dst}`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkInfo {
    /// Source network id.
    pub src: String,
    /// Destination network id.
    pub dst: String,
    /// Source network display name.
    #[serde(default)]
    pub src_name: Option<String>,
    /// Destination network display name.
    #[serde(default)]
    pub dst_name: Option<String>,
    /// Raw state string (`good`, `bad`, ...).
    pub state: String,
    /// Last sent message sequence.
    #[serde(default)]
    pub tx_seq: Option<u64>,
    /// Last received message sequence.
    #[serde(default)]
    pub rx_seq: Option<u64>,
    /// Last block height of the source chain.
    #[serde(default)]
    pub tx_height: Option<u64>,
    /// Last block height verified on the destination chain.
    #[serde(default)]
    pub rx_height: Option<u64>,
    /// Messages sent but not yet received.
    #[serde(default)]
    pub pending_count: Option<u64>,
    /// Seconds since the oldest pending message was sent.
    #[serde(default)]
    pub pending_delay: Option<f64>,
    /// Delivery deadline in seconds before the link turns bad.
    #[serde(default)]
    pub time_limit: Option<u64>,
}

impl LinkInfo {
    /// Parsed link state.
    pub fn link_state(&self) -> LinkState {
        LinkState::parse(&self.state)
    }

    /// Messages are in transit (`tx_seq > rx_seq`).
    pub fn is_delivering(&self) -> bool {
        matches!((self.tx_seq, self.rx_seq), (Some(tx), Some(rx)) if tx > rx)
    }

    /// Messages are waiting for delivery.
    pub fn has_pending(&self) -> bool {
        self.pending_count.is_some_and(|count| count > 0)
    }

    /// `src_name→dst_name`, falling back to ids.
    pub fn label(&self) -> String {
        format!(
            "{}→{}",
            self.src_name.as_deref().unwrap_or(&self.src),
            self.dst_name.as_deref().unwrap_or(&self.dst)
        )
    }
}
