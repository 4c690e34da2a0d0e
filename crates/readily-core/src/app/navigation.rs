impl<S, IN> ReaderApp<S, IN>
where
    S: Scheduler,
    IN: InputProvider,
{
    /// Word clicked in the scroll window; index is clamped.
    pub fn select_word(&mut self, index: usize) -> usize {
        let index = self.with_playback(|engine, ctx| engine.seek(index, ctx));
        debug!("ui-nav: select index={}", index);
        self.pending_redraw = true;
        index
    }

    /// Moves to `floor(percent / 100 * len)`. Out-of-range values change
    /// nothing.
    pub fn jump_to_percent(&mut self, percent: f64) -> Result<usize, ReaderError> {
        let target = navigation::percent_to_index(percent, self.tokens.len())?;
        let index = self.with_playback(|engine, ctx| engine.seek(target, ctx));
        debug!("ui-nav: jump percent={} index={}", percent, index);
        self.pending_redraw = true;
        Ok(index)
    }

    pub fn jump_to_percent_text(&mut self, raw: &str) -> Result<usize, ReaderError> {
        let percent = navigation::parse_percent(raw)?;
        self.jump_to_percent(percent)
    }

    /// First match from the start of the text. A miss keeps the index and the
    /// previous match.
    pub fn find(&mut self, query: &str) -> Result<SearchMatch, ReaderError> {
        let found = navigation::find_phrase(&self.tokens, query)?;
        self.search = Some(found);
        self.with_playback(|engine, ctx| engine.seek(found.start, ctx));
        debug!(
            "ui-nav: found start={} length={}",
            found.start, found.length
        );
        self.pending_redraw = true;
        Ok(found)
    }

    /// Switching views keeps the shared index untouched.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view_mode != mode {
            debug!("ui-nav: mode={}", mode.label());
            self.view_mode = mode;
            self.pending_redraw = true;
        }
    }

    pub fn toggle_view_mode(&mut self) {
        self.set_view_mode(self.view_mode.toggled());
    }
}
