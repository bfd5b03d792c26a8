//! Turns an extracted document into a token sequence plus page index.

use alloc::string::String;
use core::fmt::Debug;

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    page_index::{PageIndex, PageIndexBuilder},
    storage::DocumentRecord,
    tokenizer::TokenSequence,
};

/// Text extraction backend.
pub trait TextExtractor {
    type Document: ?Sized;
    type Error: Debug;

    fn page_count(&mut self, document: &Self::Document) -> Result<usize, Self::Error>;

    /// Text of one page, `page` being 1-based.
    fn extract_page_text(
        &mut self,
        document: &Self::Document,
        page: usize,
    ) -> Result<String, Self::Error>;

    /// Text of the whole document in reading order.
    fn extract_text(&mut self, document: &Self::Document) -> Result<String, Self::Error>;
}

#[derive(Debug, Error)]
pub enum ImportError<E: Debug> {
    /// `page` is `None` when the failure was not tied to a single page.
    #[error("text extraction failed (page {page:?}): {error:?}")]
    Extraction { page: Option<usize>, error: E },
    #[error("document contains no readable text")]
    EmptyContent,
}

/// Result of a successful import.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImportedDocument {
    pub tokens: TokenSequence,
    pub page_index: PageIndex,
}

impl ImportedDocument {
    pub fn total_tokens(&self) -> usize {
        self.tokens.len()
    }
}

/// Extract every page in order and build the page index alongside.
///
/// Any page failure aborts the whole import.
pub fn import_pages<X>(
    extractor: &mut X,
    document: &X::Document,
) -> Result<ImportedDocument, ImportError<X::Error>>
where
    X: TextExtractor,
{
    let pages = extractor
        .page_count(document)
        .map_err(|error| ImportError::Extraction { page: None, error })?;

    let mut tokens = TokenSequence::new();
    let mut builder = PageIndexBuilder::new();
    for page in 1..=pages {
        let text = extractor
            .extract_page_text(document, page)
            .map_err(|error| {
                warn!("import: page extraction failed page={}", page);
                ImportError::Extraction {
                    page: Some(page),
                    error,
                }
            })?;
        let added = tokens.extend_from_text(&text);
        builder.push_word_count(added);
    }

    if tokens.is_empty() {
        return Err(ImportError::EmptyContent);
    }

    info!("import: done pages={} tokens={}", pages, tokens.len());
    Ok(ImportedDocument {
        tokens,
        page_index: builder.finish(),
    })
}

/// Whole-document import with a single-page index.
pub fn import_text<X>(
    extractor: &mut X,
    document: &X::Document,
) -> Result<ImportedDocument, ImportError<X::Error>>
where
    X: TextExtractor,
{
    let text = extractor
        .extract_text(document)
        .map_err(|error| ImportError::Extraction { page: None, error })?;
    let tokens = TokenSequence::from_text(&text);
    if tokens.is_empty() {
        return Err(ImportError::EmptyContent);
    }
    Ok(ImportedDocument {
        tokens,
        page_index: PageIndex::single_page(),
    })
}

/// Re-read a known document, reusing its stored page index.
///
/// The stored index is only trusted while the token count still matches the
/// record; otherwise the document is imported page by page again.
pub fn reopen<X>(
    extractor: &mut X,
    document: &X::Document,
    record: &DocumentRecord,
) -> Result<ImportedDocument, ImportError<X::Error>>
where
    X: TextExtractor,
{
    let text = extractor
        .extract_text(document)
        .map_err(|error| ImportError::Extraction { page: None, error })?;
    let tokens = TokenSequence::from_text(&text);

    if tokens.is_empty() {
        return Err(ImportError::EmptyContent);
    }
    if tokens.len() != record.total_words {
        debug!(
            "import: token count changed id={} stored={} now={}",
            record.id,
            record.total_words,
            tokens.len()
        );
        return import_pages(extractor, document);
    }

    Ok(ImportedDocument {
        tokens,
        page_index: record.page_map.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DocumentId;
    use alloc::{string::ToString, vec, vec::Vec};

    /// Pages held in memory; `fail_on` makes that page (1-based) error out.
    struct FakeExtractor {
        fail_on: Option<usize>,
        page_calls: usize,
    }

    impl FakeExtractor {
        fn new() -> Self {
            Self {
                fail_on: None,
                page_calls: 0,
            }
        }
    }

    impl TextExtractor for FakeExtractor {
        type Document = [&'static str];
        type Error = &'static str;

        fn page_count(&mut self, document: &Self::Document) -> Result<usize, Self::Error> {
            Ok(document.len())
        }

        fn extract_page_text(
            &mut self,
            document: &Self::Document,
            page: usize,
        ) -> Result<String, Self::Error> {
            self.page_calls += 1;
            if self.fail_on == Some(page) {
                return Err("corrupt page");
            }
            document
                .get(page - 1)
                .map(|text| text.to_string())
                .ok_or("no such page")
        }

        fn extract_text(&mut self, document: &Self::Document) -> Result<String, Self::Error> {
            if self.fail_on.is_some() {
                return Err("corrupt document");
            }
            Ok(document.join("\n"))
        }
    }

    const PAGES: [&str; 3] = ["Alpha beta gamma", "   ", "delta epsilon zeta eta theta"];

    #[test]
    fn pages_build_tokens_and_index() {
        let mut extractor = FakeExtractor::new();
        let imported = import_pages(&mut extractor, &PAGES[..]).unwrap();

        assert_eq!(imported.total_tokens(), 8);
        assert_eq!(imported.page_index.starts(), &[0, 3, 3]);
        assert_eq!(imported.tokens.get(3), Some("delta"));
        assert_eq!(imported.page_index.page_for_position(7), 3);
    }

    #[test]
    fn any_page_failure_aborts_import() {
        let mut extractor = FakeExtractor::new();
        extractor.fail_on = Some(2);

        match import_pages(&mut extractor, &PAGES[..]) {
            Err(ImportError::Extraction { page, error }) => {
                assert_eq!(page, Some(2));
                assert_eq!(error, "corrupt page");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn whitespace_only_document_is_empty_content() {
        let mut extractor = FakeExtractor::new();
        let blank: [&'static str; 2] = [" \n\t", ""];

        assert!(matches!(
            import_pages(&mut extractor, &blank[..]),
            Err(ImportError::EmptyContent)
        ));
        assert!(matches!(
            import_text(&mut extractor, &blank[..]),
            Err(ImportError::EmptyContent)
        ));
    }

    #[test]
    fn zero_page_document_is_empty_content() {
        let mut extractor = FakeExtractor::new();
        let none: [&'static str; 0] = [];
        assert!(matches!(
            import_pages(&mut extractor, &none[..]),
            Err(ImportError::EmptyContent)
        ));
    }

    #[test]
    fn whole_text_import_uses_single_page() {
        let mut extractor = FakeExtractor::new();
        let imported = import_text(&mut extractor, &PAGES[..]).unwrap();

        assert_eq!(imported.total_tokens(), 8);
        assert_eq!(imported.page_index, PageIndex::single_page());
    }

    fn record(total_words: usize) -> DocumentRecord {
        DocumentRecord {
            id: DocumentId::from("doc"),
            uri: "/books/a.pdf".to_string(),
            name: "a.pdf".to_string(),
            last_index: 4,
            total_words,
            page_map: PageIndex::from_word_counts([3, 0, 5]),
            timestamp: 1,
        }
    }

    #[test]
    fn reopen_reuses_stored_index() {
        let mut extractor = FakeExtractor::new();
        let imported = reopen(&mut extractor, &PAGES[..], &record(8)).unwrap();

        assert_eq!(extractor.page_calls, 0);
        assert_eq!(imported.page_index.starts(), &[0, 3, 3]);
    }

    #[test]
    fn reopen_reimports_when_text_changed() {
        let mut extractor = FakeExtractor::new();
        let mut stale = record(5);
        stale.page_map = PageIndex::from_word_counts([5]);

        let imported = reopen(&mut extractor, &PAGES[..], &stale).unwrap();
        assert_eq!(extractor.page_calls, PAGES.len());
        assert_eq!(imported.page_index.starts(), &[0, 3, 3]);
        assert_eq!(
            imported.tokens.iter().collect::<Vec<_>>(),
            vec!["Alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta"]
        );
    }
}
