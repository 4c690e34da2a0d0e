//! App-level view models consumed by the presentation layer.

use crate::{
    navigation::{ChunkWindow, SearchMatch},
    pivot::{PivotSplit, split_word},
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ViewMode {
    #[default]
    Rsvp,
    Scroll,
}

impl ViewMode {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Rsvp => Self::Scroll,
            Self::Scroll => Self::Rsvp,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Rsvp => "rsvp",
            Self::Scroll => "scroll",
        }
    }
}

/// The current word with its fixation split.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WordView<'a> {
    pub word: &'a str,
    pub split: PivotSplit<'a>,
    pub index: usize,
    pub total: usize,
}

impl<'a> WordView<'a> {
    pub fn new(word: &'a str, index: usize, total: usize) -> Self {
        Self {
            word,
            split: split_word(word),
            index,
            total: total.max(1),
        }
    }

    /// 0..=100, reaching 100 on the last word.
    pub fn progress_pct(&self) -> u8 {
        if self.total <= 1 {
            return 100;
        }
        ((self.index.min(self.total - 1) * 100) / (self.total - 1)) as u8
    }
}

/// Playback read model shared by both screens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackStatus {
    pub running: bool,
    pub words_per_minute: u16,
    pub sentence_pause_multiplier: f32,
}

/// App-level view model consumed by the console renderer.
pub enum Screen<'a> {
    Rsvp {
        title: &'a str,
        word: WordView<'a>,
        status: PlaybackStatus,
        notice: Option<&'a str>,
    },
    Scroll {
        title: &'a str,
        window: ChunkWindow<'a>,
        current_index: usize,
        total: usize,
        search: Option<SearchMatch>,
        status: PlaybackStatus,
        notice: Option<&'a str>,
    },
}

impl Screen<'_> {
    pub fn mode(&self) -> ViewMode {
        match self {
            Self::Rsvp { .. } => ViewMode::Rsvp,
            Self::Scroll { .. } => ViewMode::Scroll,
        }
    }
}
