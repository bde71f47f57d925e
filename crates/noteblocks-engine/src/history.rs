//! Snapshot-based undo/redo with typing coalescing.
//!
//! Keystrokes inside one debounce window collapse into a single undo step:
//! the first keystroke of a burst captures the pre-burst state as the
//! *typing base*, and the base is committed to `past` when the window
//! elapses, on blur, or right before the next structural edit.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::debug;

use crate::models::Snapshot;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;
pub const DEFAULT_TYPING_DEBOUNCE: Duration = Duration::from_millis(700);

/// An explicit deadline that the host's event loop polls via `is_due`.
#[derive(Debug, Clone)]
pub struct DebounceTimer {
    window: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// (Re)start the window at `now`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<Snapshot>,
    present: Snapshot,
    future: Vec<Snapshot>,
    typing_base: Option<Snapshot>,
    timer: DebounceTimer,
    limit: usize,
}

impl History {
    pub fn new(present: Snapshot) -> Self {
        Self::with_limits(present, DEFAULT_HISTORY_LIMIT, DEFAULT_TYPING_DEBOUNCE)
    }

    pub fn with_limits(present: Snapshot, limit: usize, typing_window: Duration) -> Self {
        Self {
            past: VecDeque::new(),
            present,
            future: Vec::new(),
            typing_base: None,
            timer: DebounceTimer::new(typing_window),
            limit: limit.max(1),
        }
    }

    pub fn present(&self) -> &Snapshot {
        &self.present
    }

    pub fn can_undo(&self) -> bool {
        self.typing_base.is_some() || !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn has_pending_typing(&self) -> bool {
        self.typing_base.is_some()
    }

    pub fn timer(&self) -> &DebounceTimer {
        &self.timer
    }

    /// Record a keystroke-level change. Starting a burst discards redo.
    pub fn record_typing(&mut self, next: Snapshot, now: Instant) {
        if self.typing_base.is_none() {
            self.typing_base = Some(self.present.clone());
            self.future.clear();
        }
        self.present = next;
        self.timer.arm(now);
    }

    /// Record an edit that always gets its own undo step.
    pub fn record_structural(&mut self, next: Snapshot) {
        self.commit_typing();
        let previous = std::mem::replace(&mut self.present, next);
        self.push_past(previous);
        self.future.clear();
    }

    /// Commits the pending typing burst once its window has elapsed.
    /// Returns whether a commit happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.timer.is_due(now) {
            return false;
        }
        self.commit_typing()
    }

    /// Commit any pending typing burst immediately (blur/commit).
    pub fn flush(&mut self) -> bool {
        self.commit_typing()
    }

    pub fn undo(&mut self) -> Option<Snapshot> {
        self.timer.cancel();
        let target = match self.typing_base.take() {
            Some(base) => base,
            None => self.past.pop_back()?,
        };
        let current = std::mem::replace(&mut self.present, target);
        self.future.push(current);
        Some(self.present.clone())
    }

    pub fn redo(&mut self) -> Option<Snapshot> {
        let next = self.future.pop()?;
        let current = std::mem::replace(&mut self.present, next);
        self.push_past(current);
        Some(self.present.clone())
    }

    /// Start over from `snapshot` (document switch). The timer is cancelled
    /// before the stacks are cleared.
    pub fn reset(&mut self, snapshot: Snapshot) {
        self.timer.cancel();
        self.past.clear();
        self.future.clear();
        self.typing_base = None;
        self.present = snapshot;
    }

    fn commit_typing(&mut self) -> bool {
        self.timer.cancel();
        let Some(base) = self.typing_base.take() else {
            return false;
        };
        self.push_past(base);
        debug!("committed typing burst; {} undo steps", self.past.len());
        true
    }

    fn push_past(&mut self, snapshot: Snapshot) {
        self.past.push_back(snapshot);
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
    }
}
