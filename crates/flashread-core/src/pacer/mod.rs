//! Playback state machine that walks the token stream at a fixed rate.
//!
//! The engine never sleeps. Hosts ask [`PacingEngine::next_tick_at`] for the
//! pending deadline, wait until then and call [`PacingEngine::tick`] with the
//! current monotonic time. The deadline lives inside the `Playing` state, so
//! every transition replaces or discards it and at most one tick is ever
//! outstanding.

mod listener;

use alloc::{boxed::Box, string::String, vec::Vec};

use log::debug;

use crate::tokenizer::TokenSequence;

pub use listener::{ListenerId, PositionListener, PositionUpdate};

pub const MIN_WPM: u32 = 100;
pub const MIN_CHUNK_SIZE: usize = 1;
pub const MAX_CHUNK_SIZE: usize = 5;

const MS_PER_MINUTE: u64 = 60_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlaybackState {
    Paused,
    Playing,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickResult {
    /// Not playing, or the pending tick is not due yet.
    Idle,
    Advanced,
    /// Reached the end of the stream and paused.
    Finished,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Transport {
    Paused,
    Playing { due_ms: u64 },
}

/// Tokens currently on screen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Chunk<'a> {
    pub start: usize,
    pub tokens: &'a [String],
}

impl<'a> Chunk<'a> {
    pub fn end(&self) -> usize {
        self.start + self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }

    /// The lone token of a single-word chunk.
    pub fn single_token(&self) -> Option<&'a str> {
        match self.tokens {
            [token] => Some(token.as_str()),
            _ => None,
        }
    }
}

pub struct PacingEngine {
    tokens: TokenSequence,
    position: usize,
    wpm: u32,
    chunk_size: usize,
    transport: Transport,
    listeners: Vec<(ListenerId, Box<dyn PositionListener>)>,
    next_listener_id: u32,
}

impl PacingEngine {
    pub fn new(tokens: TokenSequence, wpm: u32, chunk_size: usize) -> Self {
        Self {
            tokens,
            position: 0,
            wpm: wpm.max(MIN_WPM),
            chunk_size: chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE),
            transport: Transport::Paused,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Start from a restored position, clamped like [`Self::seek`].
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = self.clamp_seek(i64::try_from(position).unwrap_or(i64::MAX));
        self
    }

    pub fn tokens(&self) -> &TokenSequence {
        &self.tokens
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn total_tokens(&self) -> usize {
        self.tokens.len()
    }

    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn playback(&self) -> PlaybackState {
        match self.transport {
            Transport::Paused => PlaybackState::Paused,
            Transport::Playing { .. } => PlaybackState::Playing,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.transport, Transport::Playing { .. })
    }

    /// Whether the position sits on the terminal marker.
    pub fn is_finished(&self) -> bool {
        !self.tokens.is_empty() && self.position >= self.tokens.len()
    }

    /// Milliseconds between ticks.
    ///
    /// Scales with chunk size so the effective words-per-minute stays constant.
    pub fn interval_ms(&self) -> u64 {
        interval_ms(self.wpm, self.chunk_size)
    }

    /// Deadline of the pending tick, if playing.
    pub fn next_tick_at(&self) -> Option<u64> {
        match self.transport {
            Transport::Paused => None,
            Transport::Playing { due_ms } => Some(due_ms),
        }
    }

    pub fn current_chunk(&self) -> Chunk<'_> {
        let end = self.position.saturating_add(self.chunk_size);
        Chunk {
            start: self.position.min(self.tokens.len()),
            tokens: self.tokens.slice(self.position, end),
        }
    }

    pub fn toggle_play(&mut self, now_ms: u64) {
        match self.transport {
            Transport::Paused => self.play(now_ms),
            Transport::Playing { .. } => self.pause(),
        }
    }

    /// Start playback. No-op without tokens; restarts when already finished.
    pub fn play(&mut self, now_ms: u64) {
        if self.tokens.is_empty() || self.is_playing() {
            return;
        }
        if self.is_finished() {
            self.set_position(0);
        }
        self.schedule(now_ms);
        debug!(
            "pacer: play position={} wpm={} chunk={}",
            self.position, self.wpm, self.chunk_size
        );
    }

    pub fn pause(&mut self) {
        if self.is_playing() {
            debug!("pacer: pause position={}", self.position);
        }
        self.transport = Transport::Paused;
    }

    /// Rewind to the first token and start playing.
    pub fn restart(&mut self, now_ms: u64) {
        self.transport = Transport::Paused;
        self.set_position(0);
        self.play(now_ms);
    }

    /// Run the pending tick if it is due.
    pub fn tick(&mut self, now_ms: u64) -> TickResult {
        let Transport::Playing { due_ms } = self.transport else {
            return TickResult::Idle;
        };
        if now_ms < due_ms {
            return TickResult::Idle;
        }

        let total = self.tokens.len();
        let next = self.position.saturating_add(self.chunk_size);
        if next >= total {
            self.transport = Transport::Paused;
            self.set_position(total);
            debug!("pacer: finished total={}", total);
            return TickResult::Finished;
        }

        self.schedule(now_ms);
        self.set_position(next);
        TickResult::Advanced
    }

    /// Jump to `target`, clamped to `[0, total - 1]`. Play state is kept.
    pub fn seek(&mut self, target: i64) {
        let position = self.clamp_seek(target);
        self.set_position(position);
    }

    pub fn seek_by(&mut self, delta: i64) {
        let current = i64::try_from(self.position).unwrap_or(i64::MAX);
        self.seek(current.saturating_add(delta));
    }

    /// Change the rate; a pending tick is rescheduled from `now_ms`.
    pub fn set_rate(&mut self, wpm: u32, now_ms: u64) {
        self.wpm = wpm.max(MIN_WPM);
        self.reschedule(now_ms);
    }

    /// Change the stride of future ticks without moving the position.
    pub fn set_chunk_size(&mut self, chunk_size: usize, now_ms: u64) {
        self.chunk_size = chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE);
        self.reschedule(now_ms);
    }

    /// Swap in tokens for new source text, back at the start and paused.
    pub fn replace_tokens(&mut self, tokens: TokenSequence) {
        self.transport = Transport::Paused;
        self.tokens = tokens;
        self.position = 0;
        self.notify();
    }

    pub fn subscribe(&mut self, listener: Box<dyn PositionListener>) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id = self.next_listener_id.wrapping_add(1);
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn update(&self) -> PositionUpdate {
        PositionUpdate::new(self.position, self.tokens.len())
    }

    fn clamp_seek(&self, target: i64) -> usize {
        let last = self.tokens.len().saturating_sub(1);
        usize::try_from(target.max(0)).unwrap_or(usize::MAX).min(last)
    }

    fn set_position(&mut self, position: usize) {
        if position == self.position {
            return;
        }
        self.position = position;
        self.notify();
    }

    fn notify(&mut self) {
        let update = self.update();
        for (_, listener) in self.listeners.iter_mut() {
            listener.on_position(update);
        }
    }

    fn schedule(&mut self, now_ms: u64) {
        self.transport = Transport::Playing {
            due_ms: now_ms.saturating_add(self.interval_ms()),
        };
    }

    fn reschedule(&mut self, now_ms: u64) {
        if self.is_playing() {
            self.schedule(now_ms);
        }
    }
}

impl Drop for PacingEngine {
    fn drop(&mut self) {
        self.transport = Transport::Paused;
        let update = self.update();
        for (_, listener) in self.listeners.iter_mut() {
            listener.on_teardown(update);
        }
    }
}

pub fn interval_ms(wpm: u32, chunk_size: usize) -> u64 {
    (MS_PER_MINUTE / u64::from(wpm.max(1))) * chunk_size as u64
}
