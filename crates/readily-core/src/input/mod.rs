//! Input abstraction layer.

pub mod scripted;

pub use scripted::ScriptedInput;

use crate::render::ViewMode;

/// Logical actions consumed by the reader app.
#[derive(Clone, Debug, PartialEq)]
pub enum ReaderCommand {
    Toggle,
    Start,
    Pause,
    Reset,
    Faster,
    Slower,
    SetWordsPerMinute(u16),
    SetSentencePause(f32),
    /// Raw percentage text; validated when applied.
    SeekPercent(String),
    Find(String),
    SelectWord(usize),
    SetMode(ViewMode),
    ToggleMode,
    Import(String),
    Quit,
}

impl ReaderCommand {
    /// Parses one console line such as `seek 50` or `find quick brown`.
    /// Unknown or malformed lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "" => return None,
            "toggle" | "space" | "p" => Self::Toggle,
            "start" | "play" => Self::Start,
            "pause" | "stop" => Self::Pause,
            "reset" => Self::Reset,
            "faster" | "+" => Self::Faster,
            "slower" | "-" => Self::Slower,
            "wpm" => Self::SetWordsPerMinute(rest.parse().ok()?),
            "pause-mult" | "sentence" => Self::SetSentencePause(rest.parse().ok()?),
            "seek" | "jump" => Self::SeekPercent(rest.to_owned()),
            "find" | "search" if !rest.is_empty() => Self::Find(rest.to_owned()),
            "select" | "word" => Self::SelectWord(rest.parse().ok()?),
            "mode" => match rest.to_ascii_lowercase().as_str() {
                "" => Self::ToggleMode,
                "rsvp" => Self::SetMode(ViewMode::Rsvp),
                "scroll" => Self::SetMode(ViewMode::Scroll),
                _ => return None,
            },
            "open" | "import" if !rest.is_empty() => Self::Import(rest.to_owned()),
            "quit" | "exit" | "q" => Self::Quit,
            _ => return None,
        };
        Some(command)
    }
}

/// Polled input provider.
pub trait InputProvider {
    type Error;

    fn poll_command(&mut self) -> Result<Option<ReaderCommand>, Self::Error>;
}
