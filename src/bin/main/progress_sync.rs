use std::time::{SystemTime, UNIX_EPOCH};

use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{Channel, TrySendError},
};
use flashread_core::{
    progress::{Clock, ProgressSink, ProgressWrite},
    settings::ReaderSettings,
    storage::{ApplyOutcome, KeyValueStore, Library},
};
use log::{debug, info, warn};

use super::STORE_QUEUE_DEPTH;

pub(super) type StoreChannel = Channel<CriticalSectionRawMutex, StoreCommand, STORE_QUEUE_DEPTH>;

/// Work for the store future, applied strictly in send order.
#[derive(Debug)]
pub(super) enum StoreCommand {
    Apply(ProgressWrite),
    SaveSettings(ReaderSettings),
    Shutdown,
}

pub(super) static STORE_COMMANDS: StoreChannel = Channel::new();

/// Progress sink that enqueues without waiting.
///
/// A full queue drops the write; the tracker's next save or the teardown
/// flush carries the position again.
pub(super) struct ChannelSink {
    channel: &'static StoreChannel,
}

impl ChannelSink {
    pub(super) const fn new(channel: &'static StoreChannel) -> Self {
        Self { channel }
    }
}

impl ProgressSink for ChannelSink {
    fn submit(&mut self, write: ProgressWrite) {
        if let Err(TrySendError::Full(StoreCommand::Apply(write))) =
            self.channel.try_send(StoreCommand::Apply(write))
        {
            warn!(
                "progress-save: queue full, dropped position={} revision={}",
                write.position, write.revision
            );
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(super) struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        wall_clock_ms()
    }
}

pub(super) fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Drain store commands until [`StoreCommand::Shutdown`].
pub(super) async fn store_loop<S>(channel: &'static StoreChannel, library: &mut Library<S>)
where
    S: KeyValueStore,
{
    loop {
        match channel.receive().await {
            StoreCommand::Apply(write) => match library.apply_progress(&write) {
                Ok(ApplyOutcome::Applied) => debug!(
                    "progress-save: stored locator={} position={}",
                    write.locator, write.position
                ),
                Ok(ApplyOutcome::Stale) => debug!(
                    "progress-save: skipped stale revision={}",
                    write.revision
                ),
                Err(err) => warn!(
                    "progress-save: failed position={} err={}",
                    write.position, err
                ),
            },
            StoreCommand::SaveSettings(settings) => match library.save_settings(&settings) {
                Ok(()) => info!(
                    "settings-save: stored wpm={} chunk={}",
                    settings.wpm, settings.chunk_size
                ),
                Err(err) => warn!("settings-save: failed err={}", err),
            },
            StoreCommand::Shutdown => {
                debug!("progress-save: store loop stopping");
                return;
            }
        }
    }
}
