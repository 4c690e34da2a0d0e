//! Whitespace tokenization of extracted fragments.

use core::ops::Index;

use crate::content::Fragment;

/// Stand-in token for documents without any words, so the sequence is never
/// empty and percentage/chunk math always has a non-zero length.
pub const PLACEHOLDER_TOKEN: &str = "\u{2026}";

/// Text shown before the first import.
pub const WELCOME_TEXT: &str = "Upload a PDF or EPUB to start reading.";

/// Ordered, non-empty sequence of whitespace-delimited words.
///
/// Built once per import and replaced wholesale; never mutated in place.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenSequence {
    words: Vec<String>,
    placeholder: bool,
}

impl TokenSequence {
    /// Joins fragments with a space and splits the result on whitespace runs.
    pub fn from_fragments(fragments: &[Fragment]) -> Self {
        let mut joined = String::with_capacity(fragments.iter().map(|f| f.text.len() + 1).sum());
        for fragment in fragments {
            joined.push_str(&fragment.text);
            joined.push(' ');
        }
        Self::from_text(&joined)
    }

    pub fn from_text(text: &str) -> Self {
        let words: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
        if words.is_empty() {
            return Self {
                words: vec![PLACEHOLDER_TOKEN.to_owned()],
                placeholder: true,
            };
        }

        Self {
            words,
            placeholder: false,
        }
    }

    pub fn welcome() -> Self {
        Self::from_text(WELCOME_TEXT)
    }

    /// Always at least 1.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Never true; present for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whether the sequence only holds [`PLACEHOLDER_TOKEN`].
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn last_index(&self) -> usize {
        self.words.len().saturating_sub(1)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.words
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Words joined by single spaces; tokenizing it again yields `self`.
    pub fn source_text(&self) -> String {
        if self.placeholder {
            return String::new();
        }
        self.words.join(" ")
    }
}

impl Default for TokenSequence {
    fn default() -> Self {
        Self::welcome()
    }
}

impl Index<usize> for TokenSequence {
    type Output = str;

    fn index(&self, index: usize) -> &Self::Output {
        &self.words[index]
    }
}

/// Whether a word closes a sentence (`.`, `!` or `?` as its last character).
pub fn ends_sentence(word: &str) -> bool {
    word.ends_with(['.', '!', '?'])
}
