//! Error types for the monitor core.
//!
//! This module defines the typed failures of the core using `thiserror`. Errors compose
//! via `?` and `From` conversions up to the shell's top-level error handler.
//!
//! # Error Hierarchy
//!
//! - [`FetchError`] - A single backend request failed (transport, HTTP status, malformed body)
//! - [`InvalidLinkKey`] - A `SRC:DST` link selector could not be parsed
//!
//! # Error Recovery Strategy
//!
//! Fetch errors are **non-fatal**: the poll scheduler logs them, leaves the event window
//! untouched and retries on the slow interval. Transport failures and malformed bodies are
//! collapsed into one "fetch failed" outcome there; the distinction only reaches the log.
//! An empty but successful response is never an error - it is the "no more data" signal.

use thiserror::Error;

/// A single request against the monitor backend failed.
///
/// Carries the request URL so log lines identify the failing endpoint without the
/// caller having to thread it through.
///
/// # Recovery Behavior
///
/// - **Transport / Status / Decode**: retried by the caller's own schedule, never by
///   the gateway itself.
/// - **InvalidUrl**: configuration problem; surfaces once at startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The base URL (or an endpoint derived from it) is not a valid HTTP URL.
    #[error("Invalid backend URL {url}: {reason}")]
    InvalidUrl {
        /// The URL that failed to parse.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// The request never produced an HTTP response (connection refused, timeout, DNS).
    #[error("Request to {url} failed: {reason}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Transport error message.
        reason: String,
    },

    /// The backend answered with a non-success HTTP status.
    #[error("Request to {url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response body was not the expected JSON shape.
    #[error("Malformed response from {url}: {reason}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Decoder message.
        reason: String,
    },
}

impl FetchError {
    /// Whether the failure happened before any response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport { .. })
    }

    /// The URL the failing request targeted.
    pub fn url(&self) -> &str {
        match self {
            FetchError::InvalidUrl { url, .. }
            | FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Decode { url, .. } => url,
        }
    }
}

/// A link selector string was not of the form `SRC:DST`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidLinkKey {
    /// No `:` separator.
    #[error("Link '{0}' must be written as SRC:DST")]
    MissingSeparator(String),

    /// One side of the separator is empty or the `-` placeholder.
    #[error("Link '{0}' has an empty endpoint")]
    EmptyEndpoint(String),
}
