//! Fixation-point (optimal recognition point) placement for RSVP words.

/// A word split around its pivot character.
///
/// `left`, `pivot` and `right` concatenate back to the stripped word; the
/// renderer keeps `pivot` in a fixed column so the eye never re-fixates.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PivotSplit<'a> {
    pub left: &'a str,
    pub pivot: &'a str,
    pub right: &'a str,
}

/// Character offset of the pivot inside the stripped word.
pub fn pivot_offset(word: &str) -> usize {
    offset_for_len(strip_word(word).chars().count())
}

/// Splits the stripped word at its pivot.
pub fn split_word(word: &str) -> PivotSplit<'_> {
    let stripped = strip_word(word);
    let offset = offset_for_len(stripped.chars().count());

    let Some((pivot_start, pivot_char)) = stripped.char_indices().nth(offset) else {
        // Nothing left after stripping (punctuation-only or empty word).
        return PivotSplit {
            left: stripped,
            pivot: "",
            right: "",
        };
    };
    let pivot_end = pivot_start + pivot_char.len_utf8();

    PivotSplit {
        left: &stripped[..pivot_start],
        pivot: &stripped[pivot_start..pivot_end],
        right: &stripped[pivot_end..],
    }
}

/// Drops leading and trailing characters that are not alphanumeric or `_`.
pub fn strip_word(word: &str) -> &str {
    word.trim_matches(|ch: char| !is_word_char(ch))
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn offset_for_len(len: usize) -> usize {
    match len {
        0 | 1 => 0,
        2..=5 => 1,
        6..=9 => 2,
        _ => len / 2 - 1,
    }
}
