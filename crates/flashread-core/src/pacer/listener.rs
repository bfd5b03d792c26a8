/// Position snapshot delivered to listeners after a committed change.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PositionUpdate {
    pub position: usize,
    pub total: usize,
}

impl PositionUpdate {
    pub const fn new(position: usize, total: usize) -> Self {
        Self { position, total }
    }

    /// Whether the position sits on the last token or the terminal marker.
    pub fn at_end(&self) -> bool {
        self.total > 0 && self.position + 1 >= self.total
    }
}

/// Observer registered on a [`super::PacingEngine`].
pub trait PositionListener {
    fn on_position(&mut self, update: PositionUpdate);

    /// Called once when the engine is torn down.
    fn on_teardown(&mut self, _final_position: PositionUpdate) {}
}

/// Handle returned by [`super::PacingEngine::subscribe`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ListenerId(pub(super) u32);
