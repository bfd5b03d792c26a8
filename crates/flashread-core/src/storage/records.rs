use alloc::string::String;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::page_index::PageIndex;

/// Stable identity of an imported document.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entry of the bounded "recently read" list.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFile {
    pub uri: String,
    pub name: String,
    pub last_index: usize,
    pub total_words: usize,
    /// Last touched, milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Imported document kept in the library.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub uri: String,
    pub name: String,
    pub last_index: usize,
    pub total_words: usize,
    pub page_map: PageIndex,
    /// Last touched, milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl DocumentRecord {
    pub fn recent_entry(&self) -> RecentFile {
        RecentFile {
            uri: self.uri.clone(),
            name: self.name.clone(),
            last_index: self.last_index,
            total_words: self.total_words,
            timestamp: self.timestamp,
        }
    }

    /// Reading progress in `[0, 100]`.
    pub fn percent_read(&self) -> u8 {
        if self.total_words == 0 {
            return 0;
        }
        ((self.last_index.min(self.total_words) * 100) / self.total_words) as u8
    }
}
