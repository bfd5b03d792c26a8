use alloc::{string::String, vec::Vec};

use log::{debug, warn};
use serde::{Serialize, de::DeserializeOwned};

use super::{
    DocumentId, DocumentRecord, HISTORY_KEY, KeyValueStore, LIBRARY_KEY, PersistenceError,
    RecentFile, SETTINGS_KEY,
};
use crate::{progress::ProgressWrite, settings::ReaderSettings};

pub const RECENT_CAPACITY: usize = 20;

/// Most-recent-first history, unique by uri.
pub type RecentFiles = heapless::Vec<RecentFile, RECENT_CAPACITY>;

type Result<T, E> = core::result::Result<T, PersistenceError<E>>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ApplyOutcome {
    Applied,
    /// A newer write already landed; nothing changed.
    Stale,
}

/// Recent-file history, document library and reader settings on top of a
/// [`KeyValueStore`].
///
/// The plain accessors (`recent_files`, `documents`, `load_settings`) log and
/// swallow failures so a broken store degrades to "no history"; the `try_`
/// variants surface them.
pub struct Library<S> {
    store: S,
}

impl<S> Library<S>
where
    S: KeyValueStore,
{
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn try_recent_files(&mut self) -> Result<RecentFiles, S::Error> {
        let items: Vec<RecentFile> = self.read_json(HISTORY_KEY)?.unwrap_or_default();
        Ok(items.into_iter().take(RECENT_CAPACITY).collect())
    }

    pub fn recent_files(&mut self) -> RecentFiles {
        self.try_recent_files().unwrap_or_else(|err| {
            warn!("storage: history unreadable, treating as empty: {}", err);
            RecentFiles::new()
        })
    }

    /// Move `item` to the front, replacing any entry with the same uri.
    pub fn record_recent(&mut self, item: RecentFile) -> Result<(), S::Error> {
        let existing = self.recent_files();
        let mut next = RecentFiles::new();
        let uri = item.uri.clone();
        let _ = next.push(item);
        for entry in existing.into_iter().filter(|entry| entry.uri != uri) {
            if next.push(entry).is_err() {
                break;
            }
        }
        self.write_json(HISTORY_KEY, next.as_slice())
    }

    pub fn clear_recent(&mut self) -> Result<(), S::Error> {
        self.store
            .remove(HISTORY_KEY)
            .map_err(PersistenceError::Backend)
    }

    pub fn try_documents(&mut self) -> Result<Vec<DocumentRecord>, S::Error> {
        Ok(self.read_json(LIBRARY_KEY)?.unwrap_or_default())
    }

    pub fn documents(&mut self) -> Vec<DocumentRecord> {
        self.try_documents().unwrap_or_else(|err| {
            warn!("storage: library unreadable, treating as empty: {}", err);
            Vec::new()
        })
    }

    pub fn document(&mut self, id: &DocumentId) -> Option<DocumentRecord> {
        self.documents().into_iter().find(|record| &record.id == id)
    }

    pub fn find_by_locator(&mut self, uri: &str) -> Option<DocumentRecord> {
        self.documents().into_iter().find(|record| record.uri == uri)
    }

    /// Insert `record`, or replace the one with the same id.
    ///
    /// An unreadable library is treated as empty and overwritten.
    pub fn upsert_document(&mut self, record: DocumentRecord) -> Result<(), S::Error> {
        let mut documents = self.documents();
        match documents.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => *existing = record,
            None => documents.push(record),
        }
        self.write_json(LIBRARY_KEY, &documents)
    }

    pub fn replace_documents(&mut self, records: &[DocumentRecord]) -> Result<(), S::Error> {
        self.write_json(LIBRARY_KEY, records)
    }

    /// Returns whether a record was removed.
    pub fn delete_document(&mut self, id: &DocumentId) -> Result<bool, S::Error> {
        let mut documents = self.try_documents()?;
        let before = documents.len();
        documents.retain(|record| &record.id != id);
        if documents.len() == before {
            return Ok(false);
        }
        self.write_json(LIBRARY_KEY, &documents)?;
        Ok(true)
    }

    pub fn clear_documents(&mut self) -> Result<(), S::Error> {
        self.store
            .remove(LIBRARY_KEY)
            .map_err(PersistenceError::Backend)
    }

    pub fn load_settings(&mut self) -> Option<ReaderSettings> {
        match self.read_json(SETTINGS_KEY) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("storage: settings unreadable, using defaults: {}", err);
                None
            }
        }
    }

    pub fn save_settings(&mut self, settings: &ReaderSettings) -> Result<(), S::Error> {
        self.write_json(SETTINGS_KEY, settings)
    }

    /// Store a progress snapshot in the history and the library record.
    ///
    /// Writes older than what is already stored are rejected, so a delayed
    /// write can never roll progress back. An unreadable library degrades to
    /// empty, leaving the history as the only copy. The history is written
    /// first; if the library write then fails, the history holds the newer
    /// position.
    pub fn apply_progress(&mut self, write: &ProgressWrite) -> Result<ApplyOutcome, S::Error> {
        let mut documents = self.documents();
        let recent = self.recent_files();

        let record = documents.iter_mut().find(|record| match &write.document_id {
            Some(id) => &record.id == id,
            None => record.uri == write.locator,
        });
        let record_stale = record
            .as_ref()
            .is_some_and(|record| record.timestamp > write.touched_ms);
        let recent_stale = recent
            .iter()
            .any(|entry| entry.uri == write.locator && entry.timestamp > write.touched_ms);
        if record_stale || recent_stale {
            debug!(
                "storage: stale progress ignored locator={} revision={}",
                write.locator, write.revision
            );
            return Ok(ApplyOutcome::Stale);
        }

        self.record_recent(RecentFile {
            uri: write.locator.clone(),
            name: write.display_name.clone(),
            last_index: write.position,
            total_words: write.total_tokens,
            timestamp: write.touched_ms,
        })?;

        if let Some(record) = record {
            record.last_index = write.position;
            record.total_words = write.total_tokens;
            record.timestamp = write.touched_ms;
            self.write_json(LIBRARY_KEY, &documents)?;
        }
        Ok(ApplyOutcome::Applied)
    }

    fn read_json<T>(&mut self, key: &str) -> Result<Option<T>, S::Error>
    where
        T: DeserializeOwned,
    {
        let Some(raw) = self.store.get(key).map_err(PersistenceError::Backend)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(PersistenceError::Codec)
    }

    fn write_json<T>(&mut self, key: &str, value: &T) -> Result<(), S::Error>
    where
        T: Serialize + ?Sized,
    {
        let raw: String = serde_json::to_string(value).map_err(PersistenceError::Codec)?;
        self.store
            .set(key, &raw)
            .map_err(PersistenceError::Backend)
    }
}
