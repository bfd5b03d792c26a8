//! Whitespace tokenizer producing the word stream consumed by the pacer.

use alloc::{string::String, vec::Vec};

/// Ordered, immutable sequence of non-empty word tokens.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TokenSequence {
    tokens: Vec<String>,
}

impl TokenSequence {
    pub const fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    pub fn from_text(text: &str) -> Self {
        let mut sequence = Self::new();
        sequence.extend_from_text(text);
        sequence
    }

    /// Missing text tokenizes to an empty sequence.
    pub fn from_optional(text: Option<&str>) -> Self {
        text.map(Self::from_text).unwrap_or_default()
    }

    /// Append the words of `text` and return how many were added.
    pub fn extend_from_text(&mut self, text: &str) -> usize {
        let before = self.tokens.len();
        self.tokens.extend(words(text).map(String::from));
        self.tokens.len() - before
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Tokens in `[start, end)`, truncated to the sequence bounds.
    pub fn slice(&self, start: usize, end: usize) -> &[String] {
        let end = end.min(self.tokens.len());
        let start = start.min(end);
        &self.tokens[start..end]
    }

    /// Tokens in `[start, end)` joined with single spaces.
    pub fn join(&self, start: usize, end: usize) -> String {
        self.slice(start, end).join(" ")
    }

    pub fn to_text(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Normalize `text` into word tokens.
///
/// Whitespace runs (newlines and form feeds included) collapse to one
/// separator, leading and trailing whitespace is dropped and empty input
/// yields an empty sequence rather than a single empty token.
pub fn tokenize(text: &str) -> TokenSequence {
    TokenSequence::from_text(text)
}

pub fn count_words(text: &str) -> usize {
    words(text).count()
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_separator).filter(|word| !word.is_empty())
}

// Extracted PDF text regularly carries a BOM, which `char::is_whitespace`
// does not cover.
fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || ch == '\u{feff}'
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn collect(sequence: &TokenSequence) -> Vec<&str> {
        sequence.iter().collect()
    }

    #[test]
    fn collapses_whitespace_runs() {
        let tokens = tokenize("  The\tquick\n\n brown \u{0c}fox\r\njumps  ");
        assert_eq!(collect(&tokens), vec!["The", "quick", "brown", "fox", "jumps"]);
    }

    #[test]
    fn empty_and_blank_text_yield_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \n\t \u{feff} ").is_empty());
        assert!(TokenSequence::from_optional(None).is_empty());
    }

    #[test]
    fn tokenizing_rejoined_tokens_is_idempotent() {
        for sample in [
            "",
            "single",
            "a  b\n\nc",
            "\u{a0}non\u{a0}breaking\u{2003}space",
            "mixed\u{feff}bom and\u{0c}form feed",
        ] {
            let first = tokenize(sample);
            assert!(first.iter().all(|token| !token.is_empty()));
            assert_eq!(tokenize(&first.to_text()), first);
        }
    }

    #[test]
    fn join_truncates_short_final_slice() {
        let tokens = tokenize("The quick brown fox jumps");
        assert_eq!(tokens.join(0, 2), "The quick");
        assert_eq!(tokens.join(4, 6), "jumps");
        assert_eq!(tokens.join(5, 7), "");
        assert_eq!(tokens.join(9, 3), "");
    }

    #[test]
    fn extend_reports_added_words() {
        let mut tokens = TokenSequence::new();
        assert_eq!(tokens.extend_from_text("one two three"), 3);
        assert_eq!(tokens.extend_from_text("   "), 0);
        assert_eq!(tokens.extend_from_text("four"), 1);
        assert_eq!(tokens.get(3), Some("four"));
        assert_eq!(count_words(" a b  c "), 3);
    }
}
