//! Error taxonomy shared by the extraction pipeline and the reading session.

use thiserror::Error;

/// Every failure the session can report. None of them is fatal: the session
/// keeps its previous tokens, position and playback state on any error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReaderError {
    /// Input type is neither PDF nor EPUB; rejected before extraction.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Extraction produced less text than the readability threshold.
    #[error("document has no readable text ({chars} characters, need {threshold})")]
    EmptyDocument { chars: usize, threshold: usize },

    /// Container decoder failure (corrupt archive, malformed PDF, ...).
    #[error("extraction failed: {0}")]
    ExtractionFailure(String),

    #[error("phrase not found")]
    PhraseNotFound,

    #[error("seek value must be a number within 0..=100")]
    InvalidSeekValue,

    #[error("invalid playback configuration: {0}")]
    InvalidConfig(&'static str),
}

impl ReaderError {
    /// Navigation misses are notices rather than failures.
    pub fn is_notice(&self) -> bool {
        matches!(self, Self::PhraseNotFound | Self::InvalidSeekValue)
    }
}
