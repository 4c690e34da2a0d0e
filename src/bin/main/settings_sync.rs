use log::{debug, warn};
use readily_core::settings::{PersistedSession, SessionFingerprint, SessionStore};

use super::SESSION_SAVE_DEBOUNCE_MS;

/// Debounces session saves so a running reader does not write on every word.
///
/// Changes are tracked by fingerprint; the full session (including its text)
/// is only built when a save is actually attempted.
pub(super) struct SessionSyncState {
    last_saved: Option<SessionFingerprint>,
    pending: Option<(SessionFingerprint, u64)>,
}

impl SessionSyncState {
    pub(super) fn new(initial: Option<SessionFingerprint>) -> Self {
        Self {
            last_saved: initial,
            pending: None,
        }
    }

    pub(super) fn track_current(&mut self, current: Option<SessionFingerprint>, now_ms: u64) {
        let Some(current) = current else {
            return;
        };
        if self.last_saved == Some(current) {
            self.pending = None;
            return;
        }

        match self.pending.as_mut() {
            Some((pending, changed_at_ms)) => {
                if *pending != current {
                    *pending = current;
                    *changed_at_ms = now_ms;
                }
            }
            None => {
                self.pending = Some((current, now_ms));
            }
        }
    }

    pub(super) fn flush_if_due<S, F>(&mut self, store: Option<&mut S>, now_ms: u64, snapshot: F)
    where
        S: SessionStore,
        S::Error: core::fmt::Display,
        F: FnOnce() -> Option<PersistedSession>,
    {
        let Some((_, changed_at_ms)) = self.pending else {
            return;
        };
        if now_ms.saturating_sub(changed_at_ms) < SESSION_SAVE_DEBOUNCE_MS {
            return;
        }
        self.flush(store, now_ms, snapshot);
    }

    /// Saves any pending change immediately (used on quit).
    pub(super) fn flush<S, F>(&mut self, store: Option<&mut S>, now_ms: u64, snapshot: F)
    where
        S: SessionStore,
        S::Error: core::fmt::Display,
        F: FnOnce() -> Option<PersistedSession>,
    {
        let Some((candidate, _)) = self.pending.take() else {
            return;
        };
        let Some(store) = store else {
            self.last_saved = Some(candidate);
            return;
        };
        let Some(session) = snapshot() else {
            return;
        };

        match store.save(&session) {
            Ok(()) => {
                debug!("session-save: flushed index={}", session.word_index);
                self.last_saved = Some(candidate);
            }
            Err(err) => {
                // Keep pending changes and retry after another debounce window.
                warn!("session-save: failed err={}", err);
                self.pending = Some((candidate, now_ms));
            }
        }
    }

    pub(super) fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
