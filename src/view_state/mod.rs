//! View-state layer.
//!
//! - `scroll`: ScrollPosition - semantic scroll position of the event table

pub mod scroll;

pub use scroll::ScrollPosition;
