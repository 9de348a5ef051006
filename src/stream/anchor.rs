//! One-shot scroll hints emitted after window mutations.

/// Which edge the view should snap to after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorHint {
    /// Leave the view where it is.
    #[default]
    None,
    /// Older records were prepended; show the oldest.
    Top,
    /// Newer records were appended or the window was replaced; show the newest.
    Bottom,
}

/// Holds the latest pending hint until the view consumes it.
///
/// A hint is delivered exactly once: [`ScrollAnchor::take`] resets it to
/// [`AnchorHint::None`]. A newer signal overwrites an unconsumed one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollAnchor {
    pending: AnchorHint,
}

impl ScrollAnchor {
    /// Record a hint for the next render.
    pub fn signal(&mut self, hint: AnchorHint) {
        if hint != AnchorHint::None {
            self.pending = hint;
        }
    }

    /// Consume the pending hint.
    pub fn take(&mut self) -> AnchorHint {
        std::mem::take(&mut self.pending)
    }

    /// Inspect the pending hint without consuming it.
    pub fn peek(&self) -> AnchorHint {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_delivers_once() {
        let mut anchor = ScrollAnchor::default();
        anchor.signal(AnchorHint::Bottom);
        assert_eq!(anchor.take(), AnchorHint::Bottom);
        assert_eq!(anchor.take(), AnchorHint::None);
    }

    #[test]
    fn latest_signal_wins() {
        let mut anchor = ScrollAnchor::default();
        anchor.signal(AnchorHint::Bottom);
        anchor.signal(AnchorHint::Top);
        assert_eq!(anchor.peek(), AnchorHint::Top);
    }

    #[test]
    fn none_does_not_clear_pending() {
        let mut anchor = ScrollAnchor::default();
        anchor.signal(AnchorHint::Top);
        anchor.signal(AnchorHint::None);
        assert_eq!(anchor.take(), AnchorHint::Top);
    }
}
