impl<S, IN> ReaderApp<S, IN>
where
    S: Scheduler,
    IN: InputProvider,
{
    fn process_inputs(&mut self) -> bool {
        let mut applied = false;
        loop {
            match self.input.poll_command() {
                Ok(Some(command)) => {
                    self.apply_command(command);
                    applied = true;
                }
                Ok(None) => break,
                Err(_) => {
                    warn!("input: provider error");
                    break;
                }
            }
        }
        applied
    }

    /// Applies one command. Errors surface as notices and never touch the
    /// running timer; invalid seeks are dropped silently.
    pub fn apply_command(&mut self, command: ReaderCommand) {
        debug!("input: command={:?}", command);
        self.clear_notice();

        let result = match command {
            ReaderCommand::Toggle => {
                self.toggle();
                Ok(())
            }
            ReaderCommand::Start => {
                self.start();
                Ok(())
            }
            ReaderCommand::Pause => {
                self.pause();
                Ok(())
            }
            ReaderCommand::Reset => {
                self.reset();
                Ok(())
            }
            ReaderCommand::Faster => {
                self.adjust_words_per_minute(true);
                Ok(())
            }
            ReaderCommand::Slower => {
                self.adjust_words_per_minute(false);
                Ok(())
            }
            ReaderCommand::SetWordsPerMinute(words_per_minute) => {
                self.set_words_per_minute(words_per_minute)
            }
            ReaderCommand::SetSentencePause(multiplier) => {
                self.set_sentence_pause_multiplier(multiplier)
            }
            ReaderCommand::SeekPercent(raw) => self.jump_to_percent_text(&raw).map(|_| ()),
            ReaderCommand::Find(query) => self.find(&query).map(|_| ()),
            ReaderCommand::SelectWord(index) => {
                self.select_word(index);
                Ok(())
            }
            ReaderCommand::SetMode(mode) => {
                self.set_view_mode(mode);
                Ok(())
            }
            ReaderCommand::ToggleMode => {
                self.toggle_view_mode();
                Ok(())
            }
            ReaderCommand::Import(path) => {
                self.requested_import = Some(path);
                Ok(())
            }
            ReaderCommand::Quit => {
                self.pause();
                self.quit_requested = true;
                Ok(())
            }
        };

        match result {
            Ok(()) => {}
            Err(ReaderError::InvalidSeekValue) => debug!("input: ignored invalid seek"),
            Err(err) => {
                info!("input: rejected err={}", err);
                self.set_notice(&err);
            }
        }
        self.pending_redraw = true;
    }
}
