//! Break countdown clock.
//!
//! A wall-clock-based countdown, not a calendar. It has no internal
//! thread: the owner calls `tick()` periodically (1 Hz is plenty) and
//! the clock flushes elapsed wall time against the remaining budget.
//! Delivering the finish through `tick()`'s return value means the
//! completion notification always arrives on the owner's serialized
//! context, and a cancelled clock can never fire a late completion
//! after `stop()` returns.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Finished | Stopped)
//! ```
//!
//! Both terminal states require an explicit `start` to re-enter
//! `Running`. `stop()` is idempotent and callable in every state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    Idle,
    Running,
    /// Reached zero; the finish event has been emitted exactly once.
    Finished,
    /// Explicitly cancelled before reaching zero.
    Stopped,
}

/// Cancellable countdown with an at-most-once completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakCountdown {
    state: CountdownState,
    duration_ms: u64,
    remaining_ms: u64,
    /// Wall-clock instant of the last flush while running.
    #[serde(default)]
    last_tick: Option<DateTime<Utc>>,
}

impl Default for BreakCountdown {
    fn default() -> Self {
        Self::new()
    }
}

impl BreakCountdown {
    pub fn new() -> Self {
        Self {
            state: CountdownState::Idle,
            duration_ms: 0,
            remaining_ms: 0,
            last_tick: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    /// Remaining budget after the last flush. Monotonically
    /// non-increasing between `start` calls.
    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm the clock with a fresh budget and enter `Running`.
    ///
    /// Valid from any state; a `start` while running restarts the
    /// budget. Each `start` opens a new at-most-once finish window.
    pub fn start(&mut self, duration_ms: u64, at: DateTime<Utc>) -> Event {
        self.state = CountdownState::Running;
        self.duration_ms = duration_ms;
        self.remaining_ms = duration_ms;
        self.last_tick = Some(at);
        Event::BreakStarted { duration_ms, at }
    }

    /// Flush elapsed wall time. Returns `Event::BreakFinished` on the
    /// single tick that crosses zero, `None` otherwise.
    pub fn tick(&mut self, at: DateTime<Utc>) -> Option<Event> {
        if self.state != CountdownState::Running {
            return None;
        }
        if let Some(last) = self.last_tick {
            // A clock that jumps backwards consumes nothing.
            let elapsed = (at - last).num_milliseconds().max(0) as u64;
            self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
            self.last_tick = Some(at);
        }
        if self.remaining_ms == 0 {
            self.state = CountdownState::Finished;
            self.last_tick = None;
            return Some(Event::BreakFinished { at });
        }
        None
    }

    /// Cancel the countdown. Idempotent: stopping an idle, finished, or
    /// already-stopped clock is a defined no-op, and after `stop`
    /// returns no finish can ever be emitted for this `start`.
    pub fn stop(&mut self, at: DateTime<Utc>) -> Option<Event> {
        if self.state != CountdownState::Running {
            return None;
        }
        self.state = CountdownState::Stopped;
        self.last_tick = None;
        Some(Event::BreakStopped {
            remaining_ms: self.remaining_ms,
            at,
        })
    }
}
