//! Mapping between document pages and offsets in the flat word stream.

use core::ops::Range;

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tokenizer::count_words;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum PageIndexError {
    #[error("page {page} starts at word {start}, before the previous page")]
    Decreasing { page: usize, start: usize },
}

/// Start offset of every page, in page order.
///
/// Entry `i` is the word position where page `i + 1` begins. Entries never
/// decrease; pages without words share the offset of the page that follows.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct PageIndex {
    starts: Vec<usize>,
}

/// One table-of-contents row.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TocEntry {
    /// 1-based page number.
    pub page: usize,
    pub start: usize,
}

impl PageIndex {
    pub fn from_starts(starts: Vec<usize>) -> Result<Self, PageIndexError> {
        if let Some(offset) = starts.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(PageIndexError::Decreasing {
                page: offset + 2,
                start: starts[offset + 1],
            });
        }
        Ok(Self { starts })
    }

    pub fn from_word_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut builder = PageIndexBuilder::new();
        for count in counts {
            builder.push_word_count(count);
        }
        builder.finish()
    }

    pub fn from_page_texts<'a, I>(pages: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut builder = PageIndexBuilder::new();
        for text in pages {
            builder.push_page_text(text);
        }
        builder.finish()
    }

    /// Index for content imported without page granularity.
    pub fn single_page() -> Self {
        Self {
            starts: alloc::vec![0],
        }
    }

    pub fn page_count(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    /// 1-based page containing `position`.
    ///
    /// Returns the highest page whose start is `<= position`, so a position
    /// shared by several empty pages reports the last of them. Positions
    /// before the first entry, or an empty index, report page 1.
    pub fn page_for_position(&self, position: usize) -> usize {
        self.starts
            .partition_point(|&start| start <= position)
            .max(1)
    }

    /// Word offset where the 1-based `page` begins.
    pub fn page_start(&self, page: usize) -> Option<usize> {
        page.checked_sub(1)
            .and_then(|index| self.starts.get(index))
            .copied()
    }

    /// Words belonging to the 1-based `page`, given the document's token count.
    pub fn page_word_range(&self, page: usize, total_tokens: usize) -> Option<Range<usize>> {
        let start = self.page_start(page)?;
        let end = self
            .starts
            .get(page)
            .copied()
            .unwrap_or(total_tokens)
            .max(start);
        Some(start..end)
    }

    pub fn toc(&self) -> impl Iterator<Item = TocEntry> + '_ {
        self.starts
            .iter()
            .enumerate()
            .map(|(index, &start)| TocEntry {
                page: index + 1,
                start,
            })
    }
}

impl TryFrom<Vec<usize>> for PageIndex {
    type Error = PageIndexError;

    fn try_from(starts: Vec<usize>) -> Result<Self, Self::Error> {
        Self::from_starts(starts)
    }
}

impl From<PageIndex> for Vec<usize> {
    fn from(index: PageIndex) -> Self {
        index.starts
    }
}

/// Incremental builder fed one page at a time, in page order.
#[derive(Clone, Debug, Default)]
pub struct PageIndexBuilder {
    running: usize,
    starts: Vec<usize>,
}

impl PageIndexBuilder {
    pub const fn new() -> Self {
        Self {
            running: 0,
            starts: Vec::new(),
        }
    }

    pub fn push_word_count(&mut self, count: usize) {
        self.starts.push(self.running);
        self.running += count;
    }

    pub fn push_page_text(&mut self, text: &str) {
        self.push_word_count(count_words(text));
    }

    pub fn finish(self) -> PageIndex {
        PageIndex {
            starts: self.starts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn empty_page_shares_start_offset() {
        let index = PageIndex::from_word_counts([3, 0, 5]);
        assert_eq!(index.starts(), &[0, 3, 3]);
    }

    #[test]
    fn lookup_prefers_last_tied_page() {
        let index = PageIndex::from_word_counts([3, 0, 5]);
        assert_eq!(index.page_for_position(0), 1);
        assert_eq!(index.page_for_position(2), 1);
        assert_eq!(index.page_for_position(3), 3);
        assert_eq!(index.page_for_position(7), 3);
    }

    #[test]
    fn lookup_defaults_to_first_page() {
        assert_eq!(PageIndex::default().page_for_position(42), 1);

        let shifted = PageIndex::from_starts(vec![4, 9]).unwrap();
        assert_eq!(shifted.page_for_position(1), 1);
        assert_eq!(shifted.page_for_position(9), 2);
    }

    #[test]
    fn page_texts_are_counted_with_tokenizer_rules() {
        let index = PageIndex::from_page_texts(["one two\nthree", "  \n ", "four five six seven eight"]);
        assert_eq!(index.starts(), &[0, 3, 3]);
    }

    #[test]
    fn jump_targets_and_ranges() {
        let index = PageIndex::from_word_counts([3, 0, 5]);
        assert_eq!(index.page_start(1), Some(0));
        assert_eq!(index.page_start(3), Some(3));
        assert_eq!(index.page_start(0), None);
        assert_eq!(index.page_start(4), None);
        assert_eq!(index.page_word_range(1, 8), Some(0..3));
        assert_eq!(index.page_word_range(2, 8), Some(3..3));
        assert_eq!(index.page_word_range(3, 8), Some(3..8));
    }

    #[test]
    fn toc_lists_every_page() {
        let index = PageIndex::from_word_counts([2, 4]);
        let rows: Vec<TocEntry> = index.toc().collect();
        assert_eq!(
            rows,
            vec![
                TocEntry { page: 1, start: 0 },
                TocEntry { page: 2, start: 2 },
            ]
        );
    }

    #[test]
    fn persisted_form_is_a_plain_array() {
        let index = PageIndex::from_word_counts([3, 0, 5]);
        let json = serde_json::to_string(&index).unwrap();
        assert_eq!(json, "[0,3,3]");

        let decoded: PageIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, index);
        assert!(serde_json::from_str::<PageIndex>("[0,5,2]").is_err());
    }

    #[test]
    fn decreasing_starts_are_rejected() {
        assert_eq!(
            PageIndex::from_starts(vec![0, 5, 2]),
            Err(PageIndexError::Decreasing { page: 3, start: 2 })
        );
    }
}
