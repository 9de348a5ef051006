//! Semantic scroll position of the event table.

use crate::stream::AnchorHint;

/// Semantic scroll position within the event table.
///
/// A sum type that preserves scroll intent while rows arrive:
/// - `Top`: Always shows from row 0
/// - `Bottom`: Always shows the last rows in the viewport
/// - `AtLine`: Specific absolute row offset
///
/// # Clamping Behavior
/// Every variant resolves into `[0, max(0, total_rows - viewport_height)]`,
/// so an empty table resolves to offset 0 and no position leaves the
/// viewport blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollPosition {
    /// View from the very top (row 0).
    Top,

    /// View from the very bottom (follows new rows).
    #[default]
    Bottom,

    /// Specific row offset from top.
    AtLine(usize),
}

impl ScrollPosition {
    /// Resolve to an absolute row offset, clamped to the valid range.
    pub fn resolve(&self, total_rows: usize, viewport_height: usize) -> usize {
        let max_offset = total_rows.saturating_sub(viewport_height);
        match self {
            ScrollPosition::Top => 0,
            ScrollPosition::Bottom => max_offset,
            ScrollPosition::AtLine(offset) => (*offset).min(max_offset),
        }
    }

    /// Position requested by a window mutation hint, if any.
    pub fn from_anchor(hint: AnchorHint) -> Option<Self> {
        match hint {
            AnchorHint::None => None,
            AnchorHint::Top => Some(ScrollPosition::Top),
            AnchorHint::Bottom => Some(ScrollPosition::Bottom),
        }
    }

    /// Move by `delta` rows (negative is up), starting from the resolved offset.
    ///
    /// Reaching the last page turns the position into `Bottom` so that it
    /// keeps following new rows.
    pub fn scrolled_by(&self, delta: isize, total_rows: usize, viewport_height: usize) -> Self {
        let max_offset = total_rows.saturating_sub(viewport_height);
        let current = self.resolve(total_rows, viewport_height);
        let target = current.saturating_add_signed(delta).min(max_offset);
        if target >= max_offset {
            ScrollPosition::Bottom
        } else {
            ScrollPosition::AtLine(target)
        }
    }
}
