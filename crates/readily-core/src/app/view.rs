impl<S, IN> ReaderApp<S, IN>
where
    S: Scheduler,
    IN: InputProvider,
{
    pub fn new(scheduler: S, input: IN, config: ReaderConfig) -> Self {
        let config = config.normalized();

        Self {
            scheduler,
            input,
            playback: PlaybackEngine::new(config.playback_config()),
            navigation: NavigationIndex::new(config.chunk_size),
            config,
            tokens: TokenSequence::welcome(),
            position: ReadingPosition::new(),
            search: None,
            view_mode: ViewMode::Rsvp,
            title: WELCOME_TITLE.to_owned(),
            notice: None,
            document_loaded: false,
            text_generation: 0,
            import_generation: 0,
            pending_import: None,
            requested_import: None,
            quit_requested: false,
            pending_redraw: true,
        }
    }

    /// Fires due playback timers, then applies queued commands.
    pub fn tick(&mut self, now_ms: u64) -> TickResult {
        let mut changed = self.fire_due_timers(now_ms);
        changed |= self.process_inputs();

        if self.pending_redraw {
            self.pending_redraw = false;
            changed = true;
        }

        if changed {
            TickResult::RenderRequested
        } else {
            TickResult::NoRender
        }
    }

    pub fn with_screen<F>(&self, f: F)
    where
        F: FnOnce(Screen<'_>),
    {
        let status = self.playback_status();
        let notice = self.notice.as_deref();
        let index = self.position.index();

        match self.view_mode {
            ViewMode::Rsvp => f(Screen::Rsvp {
                title: &self.title,
                word: WordView::new(
                    self.tokens.get(index).unwrap_or_default(),
                    index,
                    self.tokens.len(),
                ),
                status,
                notice,
            }),
            ViewMode::Scroll => f(Screen::Scroll {
                title: &self.title,
                window: self.navigation.window(&self.tokens, index),
                current_index: index,
                total: self.tokens.len(),
                search: self.search,
                status,
                notice,
            }),
        }
    }

    pub fn current_index(&self) -> usize {
        self.position.index()
    }

    pub fn current_word(&self) -> &str {
        self.tokens.get(self.position.index()).unwrap_or_default()
    }

    pub fn tokens(&self) -> &TokenSequence {
        &self.tokens
    }

    pub fn is_running(&self) -> bool {
        self.playback.is_running()
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        self.playback.config()
    }

    pub fn playback_status(&self) -> PlaybackStatus {
        let config = self.playback.config();
        PlaybackStatus {
            running: self.playback.is_running(),
            words_per_minute: config.words_per_minute(),
            sentence_pause_multiplier: config.sentence_pause_multiplier(),
        }
    }

    pub fn search_match(&self) -> Option<SearchMatch> {
        self.search
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn config(&self) -> ReaderConfig {
        self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn input_mut(&mut self) -> &mut IN {
        &mut self.input
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Path from the last `import` command, handed to the host loader once.
    pub fn take_import_request(&mut self) -> Option<String> {
        self.requested_import.take()
    }

    /// Snapshot for the session store; `None` while only the welcome text is
    /// loaded.
    pub fn persisted_session(&self) -> Option<PersistedSession> {
        if !self.document_loaded {
            return None;
        }

        let config = self.playback.config();
        Some(PersistedSession {
            source_text: self.tokens.source_text(),
            word_index: self.position.index(),
            words_per_minute: config.words_per_minute(),
            sentence_pause_multiplier: config.sentence_pause_multiplier(),
            view_mode: self.view_mode,
        })
    }

    /// Change detector for the session store; `None` while only the welcome
    /// text is loaded.
    pub fn session_fingerprint(&self) -> Option<SessionFingerprint> {
        if !self.document_loaded {
            return None;
        }

        let config = self.playback.config();
        Some(SessionFingerprint {
            text_generation: self.text_generation,
            word_index: self.position.index(),
            words_per_minute: config.words_per_minute(),
            sentence_pause_multiplier: config.sentence_pause_multiplier(),
            view_mode: self.view_mode,
        })
    }

    /// Applies a stored session at startup. Invalid speed settings fall back
    /// to the current ones; empty text keeps the welcome sequence.
    pub fn restore(&mut self, session: PersistedSession) {
        match PlaybackConfig::new(session.words_per_minute, session.sentence_pause_multiplier) {
            Ok(config) => {
                if let Err(err) = self.set_words_per_minute(config.words_per_minute()) {
                    warn!("session: stored wpm rejected err={}", err);
                }
                if let Err(err) =
                    self.set_sentence_pause_multiplier(config.sentence_pause_multiplier())
                {
                    warn!("session: stored pause rejected err={}", err);
                }
            }
            Err(err) => warn!("session: ignoring stored speed err={}", err),
        }
        self.view_mode = session.view_mode;

        let tokens = TokenSequence::from_text(&session.source_text);
        if tokens.is_placeholder() {
            self.pending_redraw = true;
            return;
        }

        self.tokens = tokens;
        self.search = None;
        self.title = RESTORED_TITLE.to_owned();
        self.document_loaded = true;
        self.text_generation = self.text_generation.wrapping_add(1);
        let index = self.with_playback(|engine, ctx| engine.seek(session.word_index, ctx));
        info!(
            "session: restored words={} index={}",
            self.tokens.len(),
            index
        );
        self.pending_redraw = true;
    }

    fn set_notice(&mut self, err: &ReaderError) {
        self.notice = Some(err.to_string());
        self.pending_redraw = true;
    }

    pub fn clear_notice(&mut self) {
        if self.notice.take().is_some() {
            self.pending_redraw = true;
        }
    }
}
