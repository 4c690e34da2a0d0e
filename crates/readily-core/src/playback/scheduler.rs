//! One-shot delayed timers driven by an external clock.

use log::debug;

/// Identifies one armed timer. Handles are never reused, so a handle from a
/// cancelled or superseded timer can never match the pending one.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub const fn generation(self) -> u64 {
        self.0
    }
}

/// Arms and cancels single-shot timers; fired timers are collected with
/// [`Scheduler::poll_due`] on the cooperative loop.
pub trait Scheduler {
    /// Arms a timer firing `delay_ms` after the scheduler's current time.
    fn schedule(&mut self, delay_ms: u32) -> TimerHandle;

    /// Cancels `handle`; unknown or already fired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);

    /// Returns the earliest timer due at or before `now_ms`, removing it and
    /// moving the clock to its due time. Once nothing is due the clock moves
    /// to `now_ms` and `None` is returned. Call repeatedly to drain.
    fn poll_due(&mut self, now_ms: u64) -> Option<TimerHandle>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct PendingTimer {
    handle: TimerHandle,
    due_ms: u64,
}

/// Deterministic scheduler whose time only moves through [`Scheduler::poll_due`].
#[derive(Debug, Clone, Default)]
pub struct TickScheduler {
    now_ms: u64,
    next_generation: u64,
    pending: Vec<PendingTimer>,
}

impl TickScheduler {
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    pub const fn starting_at(now_ms: u64) -> Self {
        Self {
            now_ms,
            next_generation: 0,
            pending: Vec::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of armed timers (at most one while a session drives it).
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Due time of the earliest armed timer.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.pending.iter().map(|timer| timer.due_ms).min()
    }
}

impl Scheduler for TickScheduler {
    fn schedule(&mut self, delay_ms: u32) -> TimerHandle {
        self.next_generation = self.next_generation.wrapping_add(1);
        let handle = TimerHandle(self.next_generation);
        let due_ms = self.now_ms.saturating_add(delay_ms as u64);
        self.pending.push(PendingTimer { handle, due_ms });
        debug!(
            "timer: armed generation={} due_ms={}",
            handle.generation(),
            due_ms
        );
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|timer| timer.handle != handle);
    }

    fn poll_due(&mut self, now_ms: u64) -> Option<TimerHandle> {
        let limit_ms = self.now_ms.max(now_ms);
        let due = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_ms <= limit_ms)
            .min_by_key(|(_, timer)| (timer.due_ms, timer.handle))
            .map(|(position, _)| position);

        let Some(position) = due else {
            self.now_ms = limit_ms;
            return None;
        };

        // Timers armed while handling this one count from its due time, so a
        // late poll does not push the following deadlines back.
        let timer = self.pending.swap_remove(position);
        self.now_ms = self.now_ms.max(timer.due_ms);
        Some(timer.handle)
    }
}
