use alloc::string::String;

/// Word split around its pivot character.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PivotSplit<'a> {
    pub left: &'a str,
    pub pivot: &'a str,
    pub right: &'a str,
}

/// Split `word` around the character at `floor((chars - 1) / 2)`.
///
/// Counts chars, not bytes, so multi-byte words split on char boundaries.
pub fn pivot_split(word: &str) -> Option<PivotSplit<'_>> {
    let chars = word.chars().count();
    if chars == 0 {
        return None;
    }
    let pivot_char = (chars - 1) / 2;
    let (start, pivot) = word.char_indices().nth(pivot_char)?;
    let end = start + pivot.len_utf8();
    Some(PivotSplit {
        left: &word[..start],
        pivot: &word[start..end],
        right: &word[end..],
    })
}

/// Everything a front end needs to draw one reader frame.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReaderView<'a> {
    pub title: &'a str,
    pub chunk_text: String,
    /// Only set when the chunk is a single token.
    pub pivot: Option<PivotSplit<'a>>,
    /// 1-based, `0` for an empty document.
    pub display_index: usize,
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    pub wpm: u32,
    pub chunk_size: usize,
    pub playing: bool,
    pub finished: bool,
    pub percent: u8,
}

pub(super) fn percent(position: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((position.min(total) * 100) / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(word: &str) -> (&str, &str, &str) {
        let split = pivot_split(word).unwrap();
        (split.left, split.pivot, split.right)
    }

    #[test]
    fn pivot_is_left_of_center_for_even_lengths() {
        assert_eq!(parts("a"), ("", "a", ""));
        assert_eq!(parts("ab"), ("", "a", "b"));
        assert_eq!(parts("fox"), ("f", "o", "x"));
        assert_eq!(parts("reader"), ("re", "a", "der"));
    }

    #[test]
    fn pivot_respects_char_boundaries() {
        assert_eq!(parts("über"), ("ü", "b", "er"));
        assert_eq!(parts("日本語"), ("日", "本", "語"));
        assert_eq!(pivot_split(""), None);
    }

    #[test]
    fn percent_is_bounded() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(3, 8), 37);
        assert_eq!(percent(8, 8), 100);
        assert_eq!(percent(12, 8), 100);
    }
}
