//! Reading session: owns tokens, position, playback and navigation state and
//! is the only write surface for them.

use log::{debug, info, warn};

use crate::{
    content::{self, DocumentKind, Fragment, MIN_EXTRACTED_CHARS},
    error::ReaderError,
    input::{InputProvider, ReaderCommand},
    navigation::{self, DEFAULT_CHUNK_SIZE, NavigationIndex, SearchMatch},
    playback::{
        DEFAULT_SENTENCE_PAUSE_MULTIPLIER, DEFAULT_WORDS_PER_MINUTE, PlaybackConfig, PlaybackCtx,
        PlaybackEngine, ReadingPosition, Scheduler, TimerOutcome,
    },
    render::{PlaybackStatus, Screen, WordView},
    settings::{PersistedSession, SessionFingerprint},
    tokens::TokenSequence,
};

pub use crate::render::ViewMode;

const WELCOME_TITLE: &str = "Readily";
const RESTORED_TITLE: &str = "Restored session";
const WPM_STEP: u16 = 50;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickResult {
    NoRender,
    RenderRequested,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReaderConfig {
    pub words_per_minute: u16,
    pub min_wpm: u16,
    pub max_wpm: u16,
    pub wpm_step: u16,
    pub sentence_pause_multiplier: f32,
    pub chunk_size: usize,
    pub min_extracted_chars: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            min_wpm: 100,
            max_wpm: 1000,
            wpm_step: WPM_STEP,
            sentence_pause_multiplier: DEFAULT_SENTENCE_PAUSE_MULTIPLIER,
            chunk_size: DEFAULT_CHUNK_SIZE,
            min_extracted_chars: MIN_EXTRACTED_CHARS,
        }
    }
}

impl ReaderConfig {
    /// Swaps inverted bounds and pulls out-of-range values back to sane ones.
    pub fn normalized(mut self) -> Self {
        if self.max_wpm < self.min_wpm {
            core::mem::swap(&mut self.max_wpm, &mut self.min_wpm);
        }
        self.min_wpm = self.min_wpm.max(1);
        self.max_wpm = self.max_wpm.max(self.min_wpm);
        self.words_per_minute = self.words_per_minute.clamp(self.min_wpm, self.max_wpm);
        self.wpm_step = self.wpm_step.max(1);
        if !self.sentence_pause_multiplier.is_finite() || self.sentence_pause_multiplier < 1.0 {
            self.sentence_pause_multiplier = DEFAULT_SENTENCE_PAUSE_MULTIPLIER;
        }
        self.chunk_size = self.chunk_size.max(1);
        self
    }

    fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig::new(self.words_per_minute, self.sentence_pause_multiplier)
            .unwrap_or_default()
    }
}

/// Identifies one import request; results carrying an older ticket are
/// discarded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ImportTicket {
    generation: u64,
    kind: DocumentKind,
}

impl ImportTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImportOutcome {
    Loaded { words: usize },
    /// A newer import started before this one finished.
    Superseded,
}

#[derive(Clone, Debug)]
struct PendingImport {
    ticket: ImportTicket,
    title: String,
}

pub struct ReaderApp<S, IN>
where
    S: Scheduler,
    IN: InputProvider,
{
    scheduler: S,
    input: IN,
    config: ReaderConfig,
    tokens: TokenSequence,
    position: ReadingPosition,
    playback: PlaybackEngine,
    navigation: NavigationIndex,
    search: Option<SearchMatch>,
    view_mode: ViewMode,
    title: String,
    notice: Option<String>,
    document_loaded: bool,
    text_generation: u64,
    import_generation: u64,
    pending_import: Option<PendingImport>,
    requested_import: Option<String>,
    quit_requested: bool,
    pending_redraw: bool,
}

include!("view.rs");
include!("commands.rs");
include!("runtime.rs");
include!("navigation.rs");
include!("import.rs");
