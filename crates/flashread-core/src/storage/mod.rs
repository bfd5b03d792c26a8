//! Persistence records and the key-value seam they are stored through.

mod library;
mod memory;
mod records;

use core::fmt::Debug;

use alloc::string::String;
use thiserror::Error;

pub use library::{ApplyOutcome, Library, RECENT_CAPACITY, RecentFiles};
pub use memory::MemoryStore;
pub use records::{DocumentId, DocumentRecord, RecentFile};

pub const HISTORY_KEY: &str = "rsvp_history";
pub const LIBRARY_KEY: &str = "rsvp_library";
pub const SETTINGS_KEY: &str = "rsvp_settings";

/// String key-value backend holding JSON documents.
pub trait KeyValueStore {
    type Error: Debug;

    fn get(&mut self, key: &str) -> Result<Option<String>, Self::Error>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;
    fn remove(&mut self, key: &str) -> Result<(), Self::Error>;
}

#[derive(Debug, Error)]
pub enum PersistenceError<E: Debug> {
    #[error("store backend failed: {0:?}")]
    Backend(E),
    #[error("record codec failed: {0}")]
    Codec(serde_json::Error),
}
