//! Event-log streaming and pagination engine (pure).
//!
//! Maintains a gap-free window over the server's append-only log under
//! forward polling, backward pagination and refiltering. Nothing in this
//! module performs I/O or reads the clock; the host supplies `Instant`s and
//! executes [`FetchTicket`]s.

pub mod anchor;
pub mod catalog;
pub mod controller;
pub mod filter;
pub mod scheduler;
pub mod window;

pub use anchor::{AnchorHint, ScrollAnchor};
pub use catalog::LinkCatalog;
pub use controller::{CycleOutcome, EventStream, FetchTicket, StreamHealth};
pub use filter::FilterState;
pub use scheduler::{CycleState, Pace, PollScheduler, RequestId, StreamPolicy};
pub use window::{Range, WindowStore};
