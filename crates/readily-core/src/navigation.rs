//! Random-access helpers over a [`TokenSequence`]: chunked windows for the
//! scroll view, percentage seeking and phrase search.

use core::ops::Range;

use heapless::Vec as HeaplessVec;
use log::debug;

use crate::{error::ReaderError, tokens::TokenSequence};

pub const DEFAULT_CHUNK_SIZE: usize = 300;
/// Chunks on each side of the current one that stay renderable.
pub const WINDOW_RADIUS: usize = 1;
pub const MAX_WINDOW_CHUNKS: usize = WINDOW_RADIUS * 2 + 1;

/// Most recent successful phrase match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SearchMatch {
    pub start: usize,
    pub length: usize,
}

impl SearchMatch {
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.start + self.length
    }
}

/// One renderable chunk: absolute token range plus the borrowed words.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChunkView<'a> {
    pub chunk: usize,
    pub start: usize,
    pub words: &'a [String],
}

impl ChunkView<'_> {
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.words.len()
    }

    /// Words paired with their absolute index, for click-to-select.
    pub fn indexed_words(&self) -> impl Iterator<Item = (usize, &str)> {
        self.words
            .iter()
            .enumerate()
            .map(|(offset, word)| (self.start + offset, word.as_str()))
    }
}

pub type ChunkWindow<'a> = HeaplessVec<ChunkView<'a>, MAX_WINDOW_CHUNKS>;

/// Chunk geometry for one token sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NavigationIndex {
    chunk_size: usize,
}

impl NavigationIndex {
    /// A zero chunk size is promoted to 1.
    pub const fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: if chunk_size == 0 { 1 } else { chunk_size },
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_of(&self, index: usize) -> usize {
        index / self.chunk_size
    }

    pub fn chunk_count(&self, tokens: &TokenSequence) -> usize {
        tokens.len().div_ceil(self.chunk_size)
    }

    pub fn chunk_range(&self, tokens: &TokenSequence, chunk: usize) -> Range<usize> {
        let start = (chunk * self.chunk_size).min(tokens.len());
        let end = (start + self.chunk_size).min(tokens.len());
        start..end
    }

    /// Chunks within [`WINDOW_RADIUS`] of the chunk holding `current_index`.
    pub fn window<'a>(&self, tokens: &'a TokenSequence, current_index: usize) -> ChunkWindow<'a> {
        let current = self.chunk_of(current_index.min(tokens.last_index()));
        let first = current.saturating_sub(WINDOW_RADIUS);
        let last = (current + WINDOW_RADIUS).min(self.chunk_count(tokens).saturating_sub(1));

        let mut window = ChunkWindow::new();
        for chunk in first..=last {
            let range = self.chunk_range(tokens, chunk);
            let view = ChunkView {
                chunk,
                start: range.start,
                words: &tokens.as_slice()[range],
            };
            if window.push(view).is_err() {
                break;
            }
        }
        window
    }
}

impl Default for NavigationIndex {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

/// Maps a percentage in `[0, 100]` to `floor(p / 100 * len)`, clamped to the
/// last index.
pub fn percent_to_index(percent: f64, len: usize) -> Result<usize, ReaderError> {
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(ReaderError::InvalidSeekValue);
    }

    let index = ((percent / 100.0) * len as f64).floor() as usize;
    Ok(index.min(len.saturating_sub(1)))
}

/// Parses user-entered percentages such as `"42"`, `" 12.5 "` or `"80%"`.
pub fn parse_percent(input: &str) -> Result<f64, ReaderError> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| ReaderError::InvalidSeekValue)?;

    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(ReaderError::InvalidSeekValue);
    }
    Ok(value)
}

/// Lowercases and drops every non-alphanumeric character.
pub fn normalize_search_token(token: &str) -> String {
    token
        .chars()
        .filter(|ch| ch.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// First contiguous occurrence of `query` in `tokens`, scanning from index 0.
pub fn find_phrase(tokens: &TokenSequence, query: &str) -> Result<SearchMatch, ReaderError> {
    let needle: Vec<String> = query
        .split_whitespace()
        .map(normalize_search_token)
        .filter(|token| !token.is_empty())
        .collect();
    if needle.is_empty() || needle.len() > tokens.len() || tokens.is_placeholder() {
        return Err(ReaderError::PhraseNotFound);
    }

    // Tokens with nothing searchable (dashes, ellipses) are skipped on both
    // sides; the match span still covers them in the original sequence.
    let haystack: Vec<(usize, String)> = tokens
        .iter()
        .map(normalize_search_token)
        .enumerate()
        .filter(|(_, token)| !token.is_empty())
        .collect();
    let found = haystack
        .windows(needle.len())
        .find(|candidate| {
            candidate
                .iter()
                .zip(&needle)
                .all(|((_, token), wanted)| token == wanted)
        })
        .ok_or(ReaderError::PhraseNotFound)?;

    let start = found[0].0;
    let end = found[found.len() - 1].0;
    debug!("search: start={} length={}", start, end - start + 1);
    Ok(SearchMatch {
        start,
        length: end - start + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(len: usize) -> TokenSequence {
        let text: Vec<String> = (0..len).map(|i| format!("w{i}")).collect();
        TokenSequence::from_text(&text.join(" "))
    }

    #[test]
    fn window_spans_neighbouring_chunks() {
        let tokens = numbered(1500);
        let index = NavigationIndex::default();
        let window = index.window(&tokens, 650);

        let chunks: Vec<_> = window.iter().map(|view| view.chunk).collect();
        assert_eq!(chunks, [1, 2, 3]);
        assert_eq!(window[0].range(), 300..600);
        assert_eq!(window[1].range(), 600..900);
        assert_eq!(window[2].range(), 900..1200);
        assert!(window.iter().all(|view| !view.range().contains(&0)));
        assert_eq!(window[1].indexed_words().nth(50), Some((650, "w650")));
    }

    #[test]
    fn window_is_truncated_at_edges() {
        let tokens = numbered(700);
        let index = NavigationIndex::default();

        let head: Vec<_> = index.window(&tokens, 10).iter().map(|v| v.chunk).collect();
        assert_eq!(head, [0, 1]);

        let tail = index.window(&tokens, 699);
        let chunks: Vec<_> = tail.iter().map(|v| v.chunk).collect();
        assert_eq!(chunks, [1, 2]);
        assert_eq!(tail[1].range(), 600..700);

        let one = TokenSequence::from_text("one");
        let single = index.window(&one, 0);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].words, ["one"]);
    }

    #[test]
    fn percent_maps_to_clamped_index() {
        assert_eq!(percent_to_index(0.0, 10), Ok(0));
        assert_eq!(percent_to_index(100.0, 10), Ok(9));
        assert_eq!(percent_to_index(50.0, 10), Ok(5));
        assert_eq!(percent_to_index(33.3, 10), Ok(3));
        assert_eq!(percent_to_index(100.0, 1), Ok(0));
    }

    #[test]
    fn percent_rejects_out_of_range() {
        for bad in [-0.1, 100.5, f64::NAN, f64::INFINITY] {
            assert_eq!(percent_to_index(bad, 10), Err(ReaderError::InvalidSeekValue));
        }
        assert_eq!(parse_percent("42"), Ok(42.0));
        assert_eq!(parse_percent(" 12.5% "), Ok(12.5));
        assert_eq!(parse_percent("abc"), Err(ReaderError::InvalidSeekValue));
        assert_eq!(parse_percent("150"), Err(ReaderError::InvalidSeekValue));
        assert_eq!(parse_percent(""), Err(ReaderError::InvalidSeekValue));
    }

    #[test]
    fn finds_first_phrase_ignoring_case_and_punctuation() {
        let tokens = TokenSequence::from_text("The quick brown fox.");
        assert_eq!(
            find_phrase(&tokens, "quick brown"),
            Ok(SearchMatch {
                start: 1,
                length: 2
            })
        );
        assert_eq!(
            find_phrase(&tokens, "BROWN, Fox"),
            Ok(SearchMatch {
                start: 2,
                length: 2
            })
        );
        assert_eq!(
            find_phrase(&tokens, "missing phrase"),
            Err(ReaderError::PhraseNotFound)
        );
    }

    #[test]
    fn phrase_spans_tokens_without_letters() {
        let tokens = TokenSequence::from_text("The quick \u{2014} brown fox \u{2026} jumps");
        assert_eq!(
            find_phrase(&tokens, "quick \u{2014} brown"),
            Ok(SearchMatch {
                start: 1,
                length: 3
            })
        );
        assert_eq!(
            find_phrase(&tokens, "fox jumps"),
            Ok(SearchMatch {
                start: 4,
                length: 3
            })
        );
    }

    #[test]
    fn search_starts_from_beginning() {
        let tokens = TokenSequence::from_text("to be or not to be");
        assert_eq!(find_phrase(&tokens, "to be").map(|m| m.start), Ok(0));
    }

    #[test]
    fn empty_or_punctuation_queries_miss() {
        let tokens = TokenSequence::from_text("a b c");
        assert_eq!(find_phrase(&tokens, "   "), Err(ReaderError::PhraseNotFound));
        assert_eq!(find_phrase(&tokens, "?! ..."), Err(ReaderError::PhraseNotFound));
        assert_eq!(
            find_phrase(&tokens, "a b c d"),
            Err(ReaderError::PhraseNotFound)
        );
    }

    #[test]
    fn match_span_contains() {
        let span = SearchMatch {
            start: 3,
            length: 2,
        };
        assert!(!span.contains(2));
        assert!(span.contains(3));
        assert!(span.contains(4));
        assert!(!span.contains(5));
    }
}
