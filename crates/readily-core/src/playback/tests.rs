use super::*;

struct Rig {
    engine: PlaybackEngine,
    scheduler: TickScheduler,
    tokens: TokenSequence,
    position: ReadingPosition,
}

impl Rig {
    fn new(text: &str, words_per_minute: u16) -> Self {
        Self {
            engine: PlaybackEngine::new(PlaybackConfig::new(words_per_minute, 2.0).unwrap()),
            scheduler: TickScheduler::new(),
            tokens: TokenSequence::from_text(text),
            position: ReadingPosition::new(),
        }
    }

    fn start(&mut self) {
        let ctx = PlaybackCtx {
            scheduler: &mut self.scheduler,
            tokens: &self.tokens,
            position: &mut self.position,
        };
        self.engine.start(ctx);
    }

    /// Fires every timer due at `now_ms` and returns the outcomes.
    fn run_until(&mut self, now_ms: u64) -> Vec<TimerOutcome> {
        let mut outcomes = Vec::new();
        while let Some(handle) = self.scheduler.poll_due(now_ms) {
            let ctx = PlaybackCtx {
                scheduler: &mut self.scheduler,
                tokens: &self.tokens,
                position: &mut self.position,
            };
            outcomes.push(self.engine.on_timer(handle, ctx));
        }
        outcomes
    }
}

#[test]
fn delay_uses_words_per_minute_and_sentence_multiplier() {
    let config = PlaybackConfig::new(300, 2.0).unwrap();
    assert_eq!(config.word_delay_ms("quick"), 200);
    assert_eq!(config.word_delay_ms("fox."), 400);
    assert_eq!(config.word_delay_ms("why?"), 400);

    let config = PlaybackConfig::new(300, 5.0).unwrap();
    assert_eq!(config.word_delay_ms("fox."), 1000);

    let config = PlaybackConfig::new(60, 2.0).unwrap();
    assert_eq!(config.word_delay_ms("The"), 1000);
    assert_eq!(config.word_delay_ms("end!"), 2000);

    let config = PlaybackConfig::new(7, 1.0).unwrap();
    assert_eq!(config.word_delay_ms("odd"), 8571);
}

#[test]
fn config_rejects_invalid_values() {
    assert!(matches!(
        PlaybackConfig::new(0, 2.0),
        Err(ReaderError::InvalidConfig(_))
    ));
    assert!(matches!(
        PlaybackConfig::new(300, 0.5),
        Err(ReaderError::InvalidConfig(_))
    ));
    assert!(matches!(
        PlaybackConfig::new(300, f32::NAN),
        Err(ReaderError::InvalidConfig(_))
    ));
}

#[test]
fn running_advances_one_word_per_delay() {
    let mut rig = Rig::new("The quick brown fox.", 300);
    rig.start();
    assert!(rig.engine.is_running());

    assert!(rig.run_until(199).is_empty());
    assert_eq!(rig.position.index(), 0);

    assert_eq!(rig.run_until(200), [TimerOutcome::Advanced { index: 1 }]);
    assert_eq!(rig.run_until(400), [TimerOutcome::Advanced { index: 2 }]);
    assert_eq!(rig.run_until(600), [TimerOutcome::Advanced { index: 3 }]);
    assert_eq!(rig.scheduler.pending_count(), 1);
}

#[test]
fn sentence_end_holds_longer() {
    let mut rig = Rig::new("Stop. Go on", 60);
    rig.start();

    // "Stop." is shown for 2000ms at 60 wpm with a 2x pause.
    assert!(rig.run_until(1999).is_empty());
    assert_eq!(rig.run_until(2000), [TimerOutcome::Advanced { index: 1 }]);
    assert_eq!(rig.run_until(3000), [TimerOutcome::Advanced { index: 2 }]);
}

#[test]
fn never_moves_past_last_word() {
    let mut rig = Rig::new("one two", 600);
    rig.start();

    assert_eq!(rig.run_until(100), [TimerOutcome::Advanced { index: 1 }]);
    assert_eq!(rig.run_until(200), [TimerOutcome::ReachedEnd]);
    assert!(rig.run_until(10_000).is_empty());
    assert_eq!(rig.position.index(), 1);
    assert!(rig.engine.is_running());
    assert_eq!(rig.engine.pending_timer(), None);
    assert_eq!(rig.scheduler.pending_count(), 0);
}

#[test]
fn pause_is_idempotent_and_cancels() {
    let mut rig = Rig::new("a b c d", 300);
    rig.start();
    rig.engine.pause(&mut rig.scheduler);
    rig.engine.pause(&mut rig.scheduler);

    assert!(!rig.engine.is_running());
    assert_eq!(rig.scheduler.pending_count(), 0);
    assert!(rig.run_until(5_000).is_empty());
    assert_eq!(rig.position.index(), 0);
}

#[test]
fn start_while_running_keeps_single_timer() {
    let mut rig = Rig::new("a b c d", 300);
    rig.start();
    let first = rig.engine.pending_timer();
    rig.start();

    assert_eq!(rig.engine.pending_timer(), first);
    assert_eq!(rig.scheduler.pending_count(), 1);
}

#[test]
fn toggle_flips_state() {
    let mut rig = Rig::new("a b", 300);
    for expected in [PlaybackState::Running, PlaybackState::Stopped] {
        let ctx = PlaybackCtx {
            scheduler: &mut rig.scheduler,
            tokens: &rig.tokens,
            position: &mut rig.position,
        };
        rig.engine.toggle(ctx);
        assert_eq!(rig.engine.state(), expected);
    }
    assert_eq!(rig.scheduler.pending_count(), 0);
}

#[test]
fn speed_change_rearms_from_current_word() {
    let mut rig = Rig::new("a b c d e", 300);
    rig.start();
    assert_eq!(rig.run_until(200), [TimerOutcome::Advanced { index: 1 }]);

    // Halfway into the second word the speed doubles; the next advance is
    // measured from the change, not from the original schedule.
    rig.scheduler.poll_due(300);
    let ctx = PlaybackCtx {
        scheduler: &mut rig.scheduler,
        tokens: &rig.tokens,
        position: &mut rig.position,
    };
    rig.engine.set_words_per_minute(600, ctx).unwrap();

    assert_eq!(rig.scheduler.pending_count(), 1);
    assert!(rig.run_until(399).is_empty());
    assert_eq!(rig.run_until(400), [TimerOutcome::Advanced { index: 2 }]);
    assert_eq!(rig.engine.config().words_per_minute(), 600);
}

#[test]
fn invalid_speed_change_keeps_config() {
    let mut rig = Rig::new("a b", 300);
    let ctx = PlaybackCtx {
        scheduler: &mut rig.scheduler,
        tokens: &rig.tokens,
        position: &mut rig.position,
    };
    assert!(rig.engine.set_words_per_minute(0, ctx).is_err());
    assert_eq!(rig.engine.config().words_per_minute(), 300);
}

#[test]
fn seek_clamps_and_rearms() {
    let mut rig = Rig::new("a b c d", 300);
    rig.start();
    let before = rig.engine.pending_timer();

    let ctx = PlaybackCtx {
        scheduler: &mut rig.scheduler,
        tokens: &rig.tokens,
        position: &mut rig.position,
    };
    assert_eq!(rig.engine.seek(99, ctx), 3);
    assert_ne!(rig.engine.pending_timer(), before);
    assert_eq!(rig.scheduler.pending_count(), 1);

    assert_eq!(rig.run_until(200), [TimerOutcome::ReachedEnd]);
}

#[test]
fn reset_returns_to_first_word_and_keeps_running() {
    let mut rig = Rig::new("a b c", 300);
    rig.start();
    rig.run_until(400);
    assert_eq!(rig.position.index(), 2);

    let ctx = PlaybackCtx {
        scheduler: &mut rig.scheduler,
        tokens: &rig.tokens,
        position: &mut rig.position,
    };
    rig.engine.reset(ctx);
    assert_eq!(rig.position.index(), 0);
    assert!(rig.engine.is_running());
    assert_eq!(rig.run_until(600), [TimerOutcome::Advanced { index: 1 }]);
}

#[test]
fn late_poll_keeps_word_deadlines() {
    let mut rig = Rig::new("a b c d e f", 300);
    rig.start();

    assert_eq!(rig.run_until(250), [TimerOutcome::Advanced { index: 1 }]);
    assert_eq!(rig.scheduler.next_due_ms(), Some(400));
    assert_eq!(rig.scheduler.now_ms(), 250);

    // One slow loop pass catches up every word that fell due meanwhile.
    assert_eq!(
        rig.run_until(850),
        [
            TimerOutcome::Advanced { index: 2 },
            TimerOutcome::Advanced { index: 3 },
            TimerOutcome::Advanced { index: 4 },
        ]
    );
    assert_eq!(rig.scheduler.next_due_ms(), Some(1000));
    assert_eq!(rig.scheduler.now_ms(), 850);
}

#[test]
fn stale_handles_are_ignored() {
    let mut rig = Rig::new("a b c", 300);
    rig.start();
    let stale = rig.engine.pending_timer().unwrap();
    rig.engine.pause(&mut rig.scheduler);
    rig.start();

    let ctx = PlaybackCtx {
        scheduler: &mut rig.scheduler,
        tokens: &rig.tokens,
        position: &mut rig.position,
    };
    assert_eq!(rig.engine.on_timer(stale, ctx), TimerOutcome::Stale);
    assert_eq!(rig.position.index(), 0);
}

#[test]
fn scheduler_fires_in_due_order_and_forgets_cancelled() {
    let mut scheduler = TickScheduler::new();
    let late = scheduler.schedule(300);
    let early = scheduler.schedule(100);
    let cancelled = scheduler.schedule(50);
    scheduler.cancel(cancelled);

    assert_eq!(scheduler.next_due_ms(), Some(100));
    assert_eq!(scheduler.poll_due(1_000), Some(early));
    assert_eq!(scheduler.poll_due(1_000), Some(late));
    assert_eq!(scheduler.poll_due(1_000), None);
    assert_eq!(scheduler.now_ms(), 1_000);
    assert_ne!(early.generation(), late.generation());
}

#[test]
fn adjust_steps_within_bounds() {
    let mut rig = Rig::new("a b", 950);
    let bounds = (100, 1000);
    for (increase, expected_moved, expected_wpm) in
        [(true, true, 1000), (true, false, 1000), (false, true, 950)]
    {
        let ctx = PlaybackCtx {
            scheduler: &mut rig.scheduler,
            tokens: &rig.tokens,
            position: &mut rig.position,
        };
        assert_eq!(
            rig.engine.adjust_words_per_minute(increase, bounds, 50, ctx),
            expected_moved
        );
        assert_eq!(rig.engine.config().words_per_minute(), expected_wpm);
    }
}
