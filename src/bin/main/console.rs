use core::fmt::Write as _;
use std::{
    io::{self, BufRead},
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
};

use heapless::String as HeaplessString;
use log::{debug, info};
use readily_core::{
    input::{InputProvider, ReaderCommand},
    render::{PlaybackStatus, Screen, WordView},
};

use super::ORP_ANCHOR_COLUMN;

const STATUS_LINE_BYTES: usize = 96;
const SCROLL_PREVIEW_WORDS: usize = 24;

/// Commands typed on stdin, parsed on a reader thread.
pub(super) struct ConsoleInput {
    rx: Receiver<ReaderCommand>,
}

impl ConsoleInput {
    pub(super) fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                match ReaderCommand::parse(&line) {
                    Some(command) => {
                        if tx.send(command).is_err() {
                            return;
                        }
                    }
                    None => debug!("console: ignored line={:?}", line),
                }
            }
            info!("console: stdin closed");
            let _ = tx.send(ReaderCommand::Quit);
        });
        Self { rx }
    }
}

impl InputProvider for ConsoleInput {
    type Error = TryRecvError;

    fn poll_command(&mut self) -> Result<Option<ReaderCommand>, Self::Error> {
        match self.rx.try_recv() {
            Ok(command) => Ok(Some(command)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Renders a screen as console lines.
pub(super) fn render(screen: Screen<'_>) -> String {
    let mut out = String::new();
    match screen {
        Screen::Rsvp {
            title,
            word,
            status,
            notice,
        } => {
            out.push_str(&status_line(title, &status, word.index, word.total));
            out.push('\n');
            out.push_str(&rsvp_line(&word));
            append_notice(&mut out, notice);
        }
        Screen::Scroll {
            title,
            window,
            current_index,
            total,
            search,
            status,
            notice,
        } => {
            out.push_str(&status_line(title, &status, current_index, total));
            for view in window.iter() {
                let range = view.range();
                let _ = write!(out, "\n[{}..{}]", range.start, range.end);
                for (index, word) in view.indexed_words() {
                    if index.abs_diff(current_index) > SCROLL_PREVIEW_WORDS / 2 {
                        continue;
                    }
                    let highlighted = search.is_some_and(|found| found.contains(index));
                    match (index == current_index, highlighted) {
                        (true, _) => {
                            let _ = write!(out, " >{word}<");
                        }
                        (false, true) => {
                            let _ = write!(out, " *{word}*");
                        }
                        (false, false) => {
                            let _ = write!(out, " {word}");
                        }
                    }
                }
            }
            append_notice(&mut out, notice);
        }
    }
    out
}

fn status_line(title: &str, status: &PlaybackStatus, index: usize, total: usize) -> String {
    let mut line = HeaplessString::<STATUS_LINE_BYTES>::new();
    let state = if status.running { "playing" } else { "paused" };
    if write!(
        line,
        "{} | {} | {} wpm x{:.1} | {}/{}",
        title,
        state,
        status.words_per_minute,
        status.sentence_pause_multiplier,
        index.saturating_add(1),
        total
    )
    .is_err()
    {
        // Long titles overflow the fixed buffer; fall back to the counters.
        line.clear();
        let _ = write!(
            line,
            "{} | {} wpm | {}/{}",
            state,
            status.words_per_minute,
            index.saturating_add(1),
            total
        );
    }
    line.as_str().to_owned()
}

/// Pads the word so the pivot character always lands in the anchor column.
fn rsvp_line(word: &WordView<'_>) -> String {
    let split = word.split;
    let padding = ORP_ANCHOR_COLUMN.saturating_sub(split.left.chars().count());
    format!(
        "{:padding$}{}[{}]{}",
        "",
        split.left,
        split.pivot,
        split.right,
        padding = padding
    )
}

fn append_notice(out: &mut String, notice: Option<&str>) {
    if let Some(notice) = notice {
        out.push_str("\n! ");
        out.push_str(notice);
    }
}
