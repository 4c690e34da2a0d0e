use std::collections::VecDeque;

use super::{InputProvider, ReaderCommand};

/// Replays a fixed list of commands, one per poll. Used by tests and
/// non-interactive runs.
#[derive(Default, Debug, Clone)]
pub struct ScriptedInput {
    queue: VecDeque<ReaderCommand>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_commands(commands: impl IntoIterator<Item = ReaderCommand>) -> Self {
        Self {
            queue: commands.into_iter().collect(),
        }
    }

    pub fn push(&mut self, command: ReaderCommand) {
        self.queue.push_back(command);
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl InputProvider for ScriptedInput {
    type Error = core::convert::Infallible;

    fn poll_command(&mut self) -> Result<Option<ReaderCommand>, Self::Error> {
        Ok(self.queue.pop_front())
    }
}
