//! One open document: pacing engine, page index and the reader controls
//! layered on top.

mod view;

use alloc::{boxed::Box, string::String};

use log::{debug, info};

use crate::{
    import::ImportedDocument,
    input::ReaderCommand,
    pacer::{ListenerId, PacingEngine, PositionListener, TickResult},
    page_index::{PageIndex, TocEntry},
    settings::{ReaderConfig, ReaderSettings},
};

pub use view::{PivotSplit, ReaderView, pivot_split};

/// State compared before and after a command to decide on a redraw.
type Snapshot = (usize, u32, usize, bool);

pub struct ReaderSession {
    title: String,
    page_index: PageIndex,
    config: ReaderConfig,
    engine: PacingEngine,
}

impl ReaderSession {
    pub fn new(title: impl Into<String>, document: ImportedDocument, config: ReaderConfig) -> Self {
        let engine = PacingEngine::new(document.tokens, config.wpm, config.chunk_size);
        Self {
            title: title.into(),
            page_index: document.page_index,
            config,
            engine,
        }
    }

    /// Continue from a stored position, clamped to the last token.
    pub fn resume_at(self, position: usize) -> Self {
        let Self {
            title,
            page_index,
            config,
            engine,
        } = self;
        Self {
            title,
            page_index,
            config,
            engine: engine.with_position(position),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn engine(&self) -> &PacingEngine {
        &self.engine
    }

    pub fn page_index(&self) -> &PageIndex {
        &self.page_index
    }

    pub fn toc(&self) -> impl Iterator<Item = TocEntry> + '_ {
        self.page_index.toc()
    }

    pub fn subscribe(&mut self, listener: Box<dyn PositionListener>) -> ListenerId {
        self.engine.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.engine.unsubscribe(id)
    }

    pub fn next_tick_at(&self) -> Option<u64> {
        self.engine.next_tick_at()
    }

    pub fn tick(&mut self, now_ms: u64) -> TickResult {
        let result = self.engine.tick(now_ms);
        if result == TickResult::Finished {
            info!("session: finished title={}", self.title);
        }
        result
    }

    /// Apply one command. Returns whether the view changed.
    pub fn apply(&mut self, command: ReaderCommand, now_ms: u64) -> bool {
        let before = self.snapshot();
        match command {
            ReaderCommand::TogglePlay => self.engine.toggle_play(now_ms),
            ReaderCommand::Faster => {
                let wpm = self.engine.wpm().saturating_add(self.config.wpm_step);
                self.engine.set_rate(wpm, now_ms);
            }
            ReaderCommand::Slower => {
                let wpm = self
                    .engine
                    .wpm()
                    .saturating_sub(self.config.wpm_step)
                    .max(self.config.min_wpm);
                self.engine.set_rate(wpm, now_ms);
            }
            ReaderCommand::SetRate(wpm) => {
                self.engine.set_rate(wpm.max(self.config.min_wpm), now_ms)
            }
            ReaderCommand::ChunkSize(size) => self.engine.set_chunk_size(size, now_ms),
            ReaderCommand::SeekBy(delta) => self.engine.seek_by(delta),
            ReaderCommand::SeekTo(target) => self.engine.seek(target),
            ReaderCommand::GotoPage(page) => match self.page_index.page_start(page) {
                Some(start) => self.engine.seek(i64::try_from(start).unwrap_or(i64::MAX)),
                None => debug!(
                    "session: page out of range page={} pages={}",
                    page,
                    self.page_index.page_count()
                ),
            },
            ReaderCommand::Restart => self.engine.restart(now_ms),
            ReaderCommand::Quit => self.engine.pause(),
        }
        self.snapshot() != before
    }

    /// Reader settings worth persisting across runs.
    pub fn settings(&self) -> ReaderSettings {
        ReaderSettings::new(self.engine.wpm(), self.engine.chunk_size())
    }

    pub fn view(&self) -> ReaderView<'_> {
        let chunk = self.engine.current_chunk();
        let total = self.engine.total_tokens();
        let position = self.engine.position();
        ReaderView {
            title: &self.title,
            chunk_text: chunk.text(),
            pivot: chunk.single_token().and_then(pivot_split),
            display_index: position.saturating_add(1).min(total),
            total,
            page: self.page_index.page_for_position(position),
            page_count: self.page_index.page_count(),
            wpm: self.engine.wpm(),
            chunk_size: self.engine.chunk_size(),
            playing: self.engine.is_playing(),
            finished: self.engine.is_finished(),
            percent: view::percent(position, total),
        }
    }

    fn snapshot(&self) -> Snapshot {
        (
            self.engine.position(),
            self.engine.wpm(),
            self.engine.chunk_size(),
            self.engine.is_playing(),
        )
    }
}
