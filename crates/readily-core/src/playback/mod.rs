//! Timer-driven RSVP playback state machine.
//!
//! The engine never owns the word sequence or the reading position: the
//! session lends both (plus its scheduler) for each operation through a
//! [`PlaybackCtx`], so the scroll view and the RSVP view always share one
//! index.

mod scheduler;

pub use scheduler::{Scheduler, TickScheduler, TimerHandle};

use log::debug;

use crate::{
    error::ReaderError,
    tokens::{TokenSequence, ends_sentence},
};

pub const DEFAULT_WORDS_PER_MINUTE: u16 = 300;
pub const DEFAULT_SENTENCE_PAUSE_MULTIPLIER: f32 = 2.0;

/// Validated playback speed settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackConfig {
    words_per_minute: u16,
    sentence_pause_multiplier: f32,
}

impl PlaybackConfig {
    pub fn new(words_per_minute: u16, sentence_pause_multiplier: f32) -> Result<Self, ReaderError> {
        Ok(Self {
            words_per_minute: validate_words_per_minute(words_per_minute)?,
            sentence_pause_multiplier: validate_multiplier(sentence_pause_multiplier)?,
        })
    }

    pub fn words_per_minute(&self) -> u16 {
        self.words_per_minute
    }

    pub fn sentence_pause_multiplier(&self) -> f32 {
        self.sentence_pause_multiplier
    }

    /// Milliseconds `word` stays on screen before the next advance.
    pub fn word_delay_ms(&self, word: &str) -> u32 {
        let base = 60_000.0 / self.words_per_minute as f64;
        let multiplier = if ends_sentence(word) {
            self.sentence_pause_multiplier as f64
        } else {
            1.0
        };

        (base * multiplier).round().min(u32::MAX as f64) as u32
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            sentence_pause_multiplier: DEFAULT_SENTENCE_PAUSE_MULTIPLIER,
        }
    }
}

fn validate_words_per_minute(words_per_minute: u16) -> Result<u16, ReaderError> {
    if words_per_minute == 0 {
        return Err(ReaderError::InvalidConfig("words per minute must be positive"));
    }
    Ok(words_per_minute)
}

fn validate_multiplier(multiplier: f32) -> Result<f32, ReaderError> {
    if !multiplier.is_finite() || multiplier < 1.0 {
        return Err(ReaderError::InvalidConfig(
            "sentence pause multiplier must be a finite number >= 1",
        ));
    }
    Ok(multiplier)
}

/// The shared word index, always within `[0, len - 1]`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReadingPosition {
    index: usize,
}

impl ReadingPosition {
    pub const fn new() -> Self {
        Self { index: 0 }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Sets the index clamped to the sequence and returns the stored value.
    pub fn set(&mut self, index: usize, tokens: &TokenSequence) -> usize {
        self.index = index.min(tokens.last_index());
        self.index
    }

    /// Moves one word forward; holds at the last word.
    fn advance(&mut self, tokens: &TokenSequence) -> bool {
        if self.index >= tokens.last_index() {
            return false;
        }
        self.index += 1;
        true
    }
}

/// Borrowed session state an engine operation works on.
pub struct PlaybackCtx<'a, S: Scheduler> {
    pub scheduler: &'a mut S,
    pub tokens: &'a TokenSequence,
    pub position: &'a mut ReadingPosition,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimerOutcome {
    /// Index moved forward and the next advance was armed.
    Advanced { index: usize },
    /// Already on the last word; nothing armed until the index changes.
    ReachedEnd,
    /// Handle was cancelled or superseded; ignored.
    Stale,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlaybackState {
    Stopped,
    Running,
}

/// Stopped/Running state machine with exactly one pending advance while
/// running (none once the last word is reached).
#[derive(Debug, Clone)]
pub struct PlaybackEngine {
    config: PlaybackConfig,
    running: bool,
    pending: Option<TimerHandle>,
}

impl PlaybackEngine {
    pub const fn new(config: PlaybackConfig) -> Self {
        Self {
            config,
            running: false,
            pending: None,
        }
    }

    pub fn config(&self) -> PlaybackConfig {
        self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> PlaybackState {
        if self.running {
            PlaybackState::Running
        } else {
            PlaybackState::Stopped
        }
    }

    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.pending
    }

    /// Stopped -> Running. Already running is a no-op.
    pub fn start<S: Scheduler>(&mut self, ctx: PlaybackCtx<'_, S>) {
        if self.running {
            return;
        }
        self.running = true;
        debug!("playback: start index={}", ctx.position.index());
        self.rearm(ctx);
    }

    /// Running -> Stopped, cancelling the pending advance. Idempotent.
    pub fn pause<S: Scheduler>(&mut self, scheduler: &mut S) {
        self.cancel_pending(scheduler);
        if self.running {
            debug!("playback: pause");
        }
        self.running = false;
    }

    pub fn toggle<S: Scheduler>(&mut self, ctx: PlaybackCtx<'_, S>) {
        if self.running {
            self.pause(ctx.scheduler);
        } else {
            self.start(ctx);
        }
    }

    /// Back to the first word; running state is kept.
    pub fn reset<S: Scheduler>(&mut self, ctx: PlaybackCtx<'_, S>) {
        self.seek(0, ctx);
    }

    /// Manual index change (word click, percentage jump, search hit).
    /// Clamps into the sequence and re-arms from the new word when running.
    pub fn seek<S: Scheduler>(&mut self, index: usize, ctx: PlaybackCtx<'_, S>) -> usize {
        let index = ctx.position.set(index, ctx.tokens);
        self.rearm(ctx);
        index
    }

    pub fn set_words_per_minute<S: Scheduler>(
        &mut self,
        words_per_minute: u16,
        ctx: PlaybackCtx<'_, S>,
    ) -> Result<(), ReaderError> {
        self.config.words_per_minute = validate_words_per_minute(words_per_minute)?;
        debug!("playback: wpm={}", words_per_minute);
        self.rearm(ctx);
        Ok(())
    }

    /// Steps the speed by `step` inside `min..=max`. Returns whether it moved.
    pub fn adjust_words_per_minute<S: Scheduler>(
        &mut self,
        increase: bool,
        bounds: (u16, u16),
        step: u16,
        ctx: PlaybackCtx<'_, S>,
    ) -> bool {
        let (min_wpm, max_wpm) = bounds;
        let current = self.config.words_per_minute;
        let next = if increase {
            current.saturating_add(step).min(max_wpm)
        } else {
            current.saturating_sub(step).max(min_wpm)
        };

        if next == current || next == 0 {
            return false;
        }
        self.config.words_per_minute = next;
        debug!("playback: wpm={}", next);
        self.rearm(ctx);
        true
    }

    pub fn set_sentence_pause_multiplier<S: Scheduler>(
        &mut self,
        multiplier: f32,
        ctx: PlaybackCtx<'_, S>,
    ) -> Result<(), ReaderError> {
        self.config.sentence_pause_multiplier = validate_multiplier(multiplier)?;
        debug!("playback: sentence_pause_multiplier={}", multiplier);
        self.rearm(ctx);
        Ok(())
    }

    /// Handles a fired timer. Only the currently pending handle advances.
    pub fn on_timer<S: Scheduler>(
        &mut self,
        handle: TimerHandle,
        ctx: PlaybackCtx<'_, S>,
    ) -> TimerOutcome {
        if !self.running || self.pending != Some(handle) {
            return TimerOutcome::Stale;
        }
        self.pending = None;

        if !ctx.position.advance(ctx.tokens) {
            debug!("playback: end of text index={}", ctx.position.index());
            return TimerOutcome::ReachedEnd;
        }

        let index = ctx.position.index();
        self.arm(ctx);
        TimerOutcome::Advanced { index }
    }

    /// Delay the current word would be shown for.
    pub fn current_delay_ms(&self, tokens: &TokenSequence, position: &ReadingPosition) -> u32 {
        self.config
            .word_delay_ms(tokens.get(position.index()).unwrap_or_default())
    }

    /// Cancels any pending advance and, when running, arms a fresh one for
    /// the current word.
    pub fn rearm<S: Scheduler>(&mut self, ctx: PlaybackCtx<'_, S>) {
        self.cancel_pending(ctx.scheduler);
        if self.running {
            self.arm(ctx);
        }
    }

    fn arm<S: Scheduler>(&mut self, ctx: PlaybackCtx<'_, S>) {
        let delay_ms = self.current_delay_ms(ctx.tokens, ctx.position);
        self.pending = Some(ctx.scheduler.schedule(delay_ms));
    }

    fn cancel_pending<S: Scheduler>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests;
