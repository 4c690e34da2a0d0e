impl<S, IN> ReaderApp<S, IN>
where
    S: Scheduler,
    IN: InputProvider,
{
    /// Lends the engine the session's scheduler, tokens and position.
    fn with_playback<R, F>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut PlaybackEngine, PlaybackCtx<'_, S>) -> R,
    {
        let ctx = PlaybackCtx {
            scheduler: &mut self.scheduler,
            tokens: &self.tokens,
            position: &mut self.position,
        };
        f(&mut self.playback, ctx)
    }

    fn fire_due_timers(&mut self, now_ms: u64) -> bool {
        let mut advanced = false;
        while let Some(handle) = self.scheduler.poll_due(now_ms) {
            match self.with_playback(|engine, ctx| engine.on_timer(handle, ctx)) {
                TimerOutcome::Advanced { .. } => advanced = true,
                TimerOutcome::ReachedEnd => {
                    debug!("reader: end of text index={}", self.position.index());
                }
                TimerOutcome::Stale => {}
            }
        }
        advanced
    }

    pub fn start(&mut self) {
        self.with_playback(|engine, ctx| engine.start(ctx));
        self.pending_redraw = true;
    }

    pub fn pause(&mut self) {
        self.playback.pause(&mut self.scheduler);
        self.pending_redraw = true;
    }

    pub fn toggle(&mut self) {
        self.with_playback(|engine, ctx| engine.toggle(ctx));
        self.pending_redraw = true;
    }

    pub fn reset(&mut self) {
        self.with_playback(|engine, ctx| engine.reset(ctx));
        self.pending_redraw = true;
    }

    pub fn set_words_per_minute(&mut self, words_per_minute: u16) -> Result<(), ReaderError> {
        self.with_playback(|engine, ctx| engine.set_words_per_minute(words_per_minute, ctx))?;
        self.pending_redraw = true;
        Ok(())
    }

    pub fn set_sentence_pause_multiplier(&mut self, multiplier: f32) -> Result<(), ReaderError> {
        self.with_playback(|engine, ctx| engine.set_sentence_pause_multiplier(multiplier, ctx))?;
        self.pending_redraw = true;
        Ok(())
    }

    /// One speed step inside the configured bounds.
    pub fn adjust_words_per_minute(&mut self, increase: bool) -> bool {
        let bounds = (self.config.min_wpm, self.config.max_wpm);
        let step = self.config.wpm_step;
        let moved = self.with_playback(|engine, ctx| {
            engine.adjust_words_per_minute(increase, bounds, step, ctx)
        });
        if moved {
            self.pending_redraw = true;
        }
        moved
    }
}
