//! Decides when reading progress is worth persisting and hands writes to a
//! non-blocking sink.

use alloc::string::String;

use log::debug;

use crate::{
    pacer::{PositionListener, PositionUpdate},
    storage::DocumentId,
};

/// Minimum displacement, in words, that triggers a save.
pub const SAVE_DISPLACEMENT: usize = 5;

/// Document a tracker reports progress for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProgressTarget {
    pub document_id: Option<DocumentId>,
    pub locator: String,
    pub display_name: String,
}

/// One persisted progress snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProgressWrite {
    pub document_id: Option<DocumentId>,
    pub locator: String,
    pub display_name: String,
    pub position: usize,
    pub total_tokens: usize,
    /// Wall-clock milliseconds, strictly increasing per tracker.
    pub touched_ms: u64,
    pub revision: u64,
}

/// Receiver of progress writes. Must not block the caller.
pub trait ProgressSink {
    fn submit(&mut self, write: ProgressWrite);
}

/// Wall-clock source for record timestamps.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Persistence policy.
///
/// Saves when the position moved more than [`SAVE_DISPLACEMENT`] words from
/// the last persisted one, or when it reached the last token or the terminal
/// marker. A chunked stride can jump over the last token straight to the
/// marker, so both count.
pub fn should_persist(position: usize, last_persisted: Option<usize>, total: usize) -> bool {
    let Some(last) = last_persisted else {
        return true;
    };
    if position.abs_diff(last) > SAVE_DISPLACEMENT {
        return true;
    }
    position != last && PositionUpdate::new(position, total).at_end()
}

pub struct ProgressTracker<S, C> {
    target: ProgressTarget,
    sink: S,
    clock: C,
    last_persisted: Option<usize>,
    last_touched_ms: u64,
    revision: u64,
}

impl<S, C> ProgressTracker<S, C>
where
    S: ProgressSink,
    C: Clock,
{
    pub fn new(target: ProgressTarget, sink: S, clock: C) -> Self {
        Self {
            target,
            sink,
            clock,
            last_persisted: None,
            last_touched_ms: 0,
            revision: 0,
        }
    }

    /// Treat `position` as already persisted, e.g. when resuming a document.
    pub fn resuming_from(mut self, position: usize) -> Self {
        self.last_persisted = Some(position);
        self
    }

    pub fn last_persisted(&self) -> Option<usize> {
        self.last_persisted
    }

    /// Apply the persistence policy to a position change.
    pub fn observe(&mut self, update: PositionUpdate) -> bool {
        if !should_persist(update.position, self.last_persisted, update.total) {
            return false;
        }
        self.persist(update);
        true
    }

    /// Persist unconditionally unless the position is already saved.
    pub fn flush(&mut self, update: PositionUpdate) -> bool {
        if self.last_persisted == Some(update.position) {
            return false;
        }
        self.persist(update);
        true
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn persist(&mut self, update: PositionUpdate) {
        let touched_ms = self
            .clock
            .now_ms()
            .max(self.last_touched_ms.saturating_add(1));
        self.last_touched_ms = touched_ms;
        self.revision += 1;
        self.last_persisted = Some(update.position);

        debug!(
            "progress: submit locator={} position={} total={} revision={}",
            self.target.locator, update.position, update.total, self.revision
        );
        self.sink.submit(ProgressWrite {
            document_id: self.target.document_id.clone(),
            locator: self.target.locator.clone(),
            display_name: self.target.display_name.clone(),
            position: update.position,
            total_tokens: update.total,
            touched_ms,
            revision: self.revision,
        });
    }
}

impl<S, C> PositionListener for ProgressTracker<S, C>
where
    S: ProgressSink,
    C: Clock,
{
    fn on_position(&mut self, update: PositionUpdate) {
        self.observe(update);
    }

    fn on_teardown(&mut self, final_position: PositionUpdate) {
        self.flush(final_position);
    }
}
