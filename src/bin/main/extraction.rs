use std::{
    fs, io,
    path::{Path, PathBuf},
};

use flashread_core::import::TextExtractor;
use log::debug;
use thiserror::Error;

/// Separator `pdftotext` writes between pages.
const PAGE_BREAK: char = '\x0c';

#[derive(Debug, Error)]
pub(super) enum ExtractionError {
    #[error("cannot read {}: {cause}", path.display())]
    Read { path: PathBuf, cause: io::Error },
    #[error("{} is not UTF-8 text", path.display())]
    NotText { path: PathBuf },
    #[error("page {page} is out of range ({pages} pages)")]
    PageOutOfRange { page: usize, pages: usize },
}

/// Reads page dumps: UTF-8 text with pages separated by form feeds.
///
/// The last loaded file is cached so page-by-page extraction reads it once.
#[derive(Default)]
pub(super) struct PageDumpExtractor {
    cached: Option<(PathBuf, Vec<String>)>,
}

impl PageDumpExtractor {
    pub(super) fn new() -> Self {
        Self::default()
    }

    fn pages(&mut self, path: &Path) -> Result<&[String], ExtractionError> {
        let stale = self
            .cached
            .as_ref()
            .is_none_or(|(cached_path, _)| cached_path != path);
        if stale {
            let pages = load_pages(path)?;
            debug!(
                "extract: loaded path={} pages={}",
                path.display(),
                pages.len()
            );
            self.cached = Some((path.to_path_buf(), pages));
        }
        Ok(self
            .cached
            .as_ref()
            .map(|(_, pages)| pages.as_slice())
            .unwrap_or_default())
    }
}

impl TextExtractor for PageDumpExtractor {
    type Document = Path;
    type Error = ExtractionError;

    fn page_count(&mut self, document: &Path) -> Result<usize, Self::Error> {
        Ok(self.pages(document)?.len())
    }

    fn extract_page_text(&mut self, document: &Path, page: usize) -> Result<String, Self::Error> {
        let pages = self.pages(document)?;
        page.checked_sub(1)
            .and_then(|index| pages.get(index))
            .cloned()
            .ok_or(ExtractionError::PageOutOfRange {
                page,
                pages: pages.len(),
            })
    }

    fn extract_text(&mut self, document: &Path) -> Result<String, Self::Error> {
        Ok(self.pages(document)?.join("\n"))
    }
}

fn load_pages(path: &Path) -> Result<Vec<String>, ExtractionError> {
    let bytes = fs::read(path).map_err(|cause| ExtractionError::Read {
        path: path.to_path_buf(),
        cause,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| ExtractionError::NotText {
        path: path.to_path_buf(),
    })?;
    Ok(split_pages(&text))
}

/// Split a dump into pages. The break `pdftotext` emits after the final page
/// does not start another one.
fn split_pages(text: &str) -> Vec<String> {
    let body = text.strip_suffix(PAGE_BREAK).unwrap_or(text);
    body.split(PAGE_BREAK).map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashread_core::import::{ImportError, import_pages};
    use std::io::Write;

    #[test]
    fn trailing_break_does_not_add_a_page() {
        assert_eq!(split_pages("one\x0ctwo\x0c"), vec!["one", "two"]);
        assert_eq!(split_pages("one\x0c\x0cthree"), vec!["one", "", "three"]);
        assert_eq!(split_pages("single"), vec!["single"]);
    }

    #[test]
    fn imports_page_dump_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "The quick brown\x0c\x0cfox jumps over the lazy\x0c").unwrap();

        let mut extractor = PageDumpExtractor::new();
        let imported = import_pages(&mut extractor, file.path()).unwrap();
        assert_eq!(imported.total_tokens(), 8);
        assert_eq!(imported.page_index.starts(), &[0, 3, 3]);
    }

    #[test]
    fn missing_file_is_an_extraction_failure() {
        let mut extractor = PageDumpExtractor::new();
        let result = import_pages(&mut extractor, Path::new("/nonexistent/book.txt"));
        assert!(matches!(
            result,
            Err(ImportError::Extraction {
                page: None,
                error: ExtractionError::Read { .. }
            })
        ));
    }

    #[test]
    fn binary_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x25, 0x50, 0x44, 0x46, 0xff, 0xfe]).unwrap();

        let mut extractor = PageDumpExtractor::new();
        assert!(matches!(
            extractor.extract_text(file.path()),
            Err(ExtractionError::NotText { .. })
        ));
    }

    #[test]
    fn page_numbers_are_one_based() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "first\x0csecond").unwrap();

        let mut extractor = PageDumpExtractor::new();
        assert_eq!(extractor.extract_page_text(file.path(), 2).unwrap(), "second");
        assert!(matches!(
            extractor.extract_page_text(file.path(), 0),
            Err(ExtractionError::PageOutOfRange { page: 0, pages: 2 })
        ));
    }
}
