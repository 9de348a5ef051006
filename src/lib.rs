//! BTP relay monitor (btp-monitor)
//!
//! Terminal dashboard for a BTP relay monitor backend: a live, filterable,
//! paginated view of the relay event log plus per-link delivery status.
//!
//! Pure Core / Impure Shell: `model`, `stream` and `state` never touch the
//! network or the terminal. `gateway` performs HTTP on worker threads and
//! `view` owns the terminal.

pub mod config;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod state;
pub mod stream;
pub mod view;
pub mod view_state;
