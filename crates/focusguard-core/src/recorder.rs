//! Timeline recorder.
//!
//! Converts the stream of `(state, timestamp)` observations into a
//! gapless, non-overlapping interval timeline for exactly one session
//! at a time.
//!
//! ## Lifecycle
//!
//! ```text
//! start(at) -> observe(state, at)* -> finish(at) -> CompletedSession
//! ```
//!
//! The recorder holds closed intervals in a list and the single open
//! interval as a separate field, so the "at most one open interval,
//! and it is the last" invariant cannot be violated by construction.
//! Timestamps must be non-decreasing per session; a timestamp before
//! the open interval's start is rejected.

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::error::RecorderError;
use crate::session::{AttentionState, CompletedSession, OpenInterval, StateInterval};

#[derive(Debug, Clone)]
struct ActiveSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    closed: Vec<StateInterval>,
    open: OpenInterval,
}

/// Records one session's timeline from a stream of observations.
///
/// All mutating calls must come from the single owner context (the
/// coordinator); see the crate docs for the serialization model.
#[derive(Debug, Clone, Default)]
pub struct TimelineRecorder {
    active: Option<ActiveSession>,
}

impl TimelineRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Open a new session at `at` with an `Awake` open interval.
    ///
    /// # Errors
    /// `AlreadyRunning` if a session is still open.
    pub fn start(&mut self, at: DateTime<Utc>) -> Result<Uuid, RecorderError> {
        self.start_with(AttentionState::Awake, at)
    }

    /// Open a new session whose first interval has the given state.
    ///
    /// # Errors
    /// `AlreadyRunning` if a session is still open.
    pub fn start_with(
        &mut self,
        initial: AttentionState,
        at: DateTime<Utc>,
    ) -> Result<Uuid, RecorderError> {
        if self.active.is_some() {
            return Err(RecorderError::AlreadyRunning);
        }
        let id = Uuid::new_v4();
        self.active = Some(ActiveSession {
            id,
            started_at: at,
            closed: Vec::new(),
            open: OpenInterval::new(initial, at),
        });
        Ok(id)
    }

    /// Record an observation.
    ///
    /// Returns the previous state when a new interval was opened, or
    /// `None` when the state matched the open interval (idempotent
    /// no-op, so rapid duplicate observations never fragment the
    /// timeline). Two observations at the identical timestamp are
    /// legal: the earlier interval closes with zero duration and is
    /// retained.
    ///
    /// # Errors
    /// `NoActiveSession` if no session is open; `NonMonotonicTimestamp`
    /// if `at` predates the open interval's start.
    pub fn observe(
        &mut self,
        state: AttentionState,
        at: DateTime<Utc>,
    ) -> Result<Option<AttentionState>, RecorderError> {
        let active = self.active.as_mut().ok_or(RecorderError::NoActiveSession)?;
        if active.open.state == state {
            return Ok(None);
        }
        if at < active.open.start {
            return Err(RecorderError::NonMonotonicTimestamp {
                at,
                interval_start: active.open.start,
            });
        }
        let previous = active.open.state;
        let next = OpenInterval::new(state, at);
        let closed = std::mem::replace(&mut active.open, next).close(at);
        active.closed.push(closed);
        Ok(Some(previous))
    }

    /// Close the session at `at` and return the immutable record.
    ///
    /// Clears internal state so a new `start` may follow.
    ///
    /// # Errors
    /// `NoActiveSession` if no session is open; `NonMonotonicTimestamp`
    /// if `at` predates the open interval's start.
    pub fn finish(&mut self, at: DateTime<Utc>) -> Result<CompletedSession, RecorderError> {
        if let Some(active) = &self.active {
            if at < active.open.start {
                return Err(RecorderError::NonMonotonicTimestamp {
                    at,
                    interval_start: active.open.start,
                });
            }
        }
        let active = self.active.take().ok_or(RecorderError::NoActiveSession)?;
        let mut events = active.closed;
        events.push(active.open.close(at));
        Ok(CompletedSession {
            id: active.id,
            start: active.started_at,
            end: at,
            events,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.active.as_ref().map(|a| a.id)
    }

    pub fn session_start(&self) -> Option<DateTime<Utc>> {
        self.active.as_ref().map(|a| a.started_at)
    }

    /// Read-only snapshot of the open interval: its state and how long
    /// it has been open as of `now`. Never mutates.
    pub fn current(&self, now: DateTime<Utc>) -> Option<(AttentionState, TimeDelta)> {
        self.active
            .as_ref()
            .map(|a| (a.open.state, a.open.elapsed(now)))
    }

    /// Per-interval `(state, duration)` view of the open session, the
    /// open tail measured up to `now`. This is the same shape a
    /// [`CompletedSession`] yields, so live and historical reporting
    /// share one aggregation path.
    pub fn spans(&self, now: DateTime<Utc>) -> Vec<(AttentionState, TimeDelta)> {
        let Some(active) = &self.active else {
            return Vec::new();
        };
        let mut spans: Vec<_> = active
            .closed
            .iter()
            .map(|i| (i.state, i.duration()))
            .collect();
        spans.push((active.open.state, active.open.elapsed(now)));
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn start_twice_fails() {
        let mut rec = TimelineRecorder::new();
        rec.start(t(0)).unwrap();
        assert_eq!(rec.start(t(1)), Err(RecorderError::AlreadyRunning));
    }

    #[test]
    fn observe_without_session_fails() {
        let mut rec = TimelineRecorder::new();
        assert_eq!(
            rec.observe(AttentionState::Yawning, t(0)),
            Err(RecorderError::NoActiveSession)
        );
        assert!(matches!(rec.finish(t(0)), Err(RecorderError::NoActiveSession)));
    }

    #[test]
    fn duplicate_observation_is_noop() {
        let mut rec = TimelineRecorder::new();
        rec.start(t(0)).unwrap();
        assert_eq!(rec.observe(AttentionState::Awake, t(5)).unwrap(), None);
        assert_eq!(rec.observe(AttentionState::Awake, t(9)).unwrap(), None);
        let session = rec.finish(t(10)).unwrap();
        assert_eq!(session.events.len(), 1);
    }

    #[test]
    fn state_change_closes_and_reopens() {
        let mut rec = TimelineRecorder::new();
        rec.start(t(0)).unwrap();
        let prev = rec.observe(AttentionState::Yawning, t(300)).unwrap();
        assert_eq!(prev, Some(AttentionState::Awake));
        rec.observe(AttentionState::Awake, t(900)).unwrap();
        let session = rec.finish(t(1200)).unwrap();

        let states: Vec<_> = session.events.iter().map(|e| e.state).collect();
        assert_eq!(
            states,
            vec![
                AttentionState::Awake,
                AttentionState::Yawning,
                AttentionState::Awake
            ]
        );
        // Contiguous, gapless.
        for pair in session.events.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(session.events[1].duration(), TimeDelta::seconds(600));
        assert_eq!(session.duration(), TimeDelta::seconds(1200));
    }

    #[test]
    fn non_monotonic_timestamp_rejected() {
        let mut rec = TimelineRecorder::new();
        rec.start(t(100)).unwrap();
        let err = rec.observe(AttentionState::HeadDown, t(50)).unwrap_err();
        assert!(matches!(err, RecorderError::NonMonotonicTimestamp { .. }));
        // The open interval is untouched by the failed call.
        assert_eq!(
            rec.current(t(200)).unwrap(),
            (AttentionState::Awake, TimeDelta::seconds(100))
        );
    }

    #[test]
    fn zero_length_interval_retained() {
        let mut rec = TimelineRecorder::new();
        rec.start(t(0)).unwrap();
        rec.observe(AttentionState::EyesClosed, t(10)).unwrap();
        rec.observe(AttentionState::NoFaceDetected, t(10)).unwrap();
        let session = rec.finish(t(20)).unwrap();
        assert_eq!(session.events.len(), 3);
        assert_eq!(session.events[1].duration(), TimeDelta::zero());
        assert_eq!(session.events[1].state, AttentionState::EyesClosed);
    }

    #[test]
    fn finish_clears_state_for_restart() {
        let mut rec = TimelineRecorder::new();
        rec.start(t(0)).unwrap();
        rec.finish(t(0)).unwrap();
        assert!(!rec.is_running());
        rec.start(t(100)).unwrap();
        assert!(rec.is_running());
    }

    #[test]
    fn immediate_finish_yields_single_zero_interval() {
        let mut rec = TimelineRecorder::new();
        rec.start(t(0)).unwrap();
        let session = rec.finish(t(0)).unwrap();
        assert_eq!(session.events.len(), 1);
        assert_eq!(session.events[0].duration(), TimeDelta::zero());
        assert_eq!(session.duration(), TimeDelta::zero());
    }

    #[test]
    fn spans_include_open_tail() {
        let mut rec = TimelineRecorder::new();
        rec.start(t(0)).unwrap();
        rec.observe(AttentionState::Yawning, t(60)).unwrap();
        let spans = rec.spans(t(90));
        assert_eq!(
            spans,
            vec![
                (AttentionState::Awake, TimeDelta::seconds(60)),
                (AttentionState::Yawning, TimeDelta::seconds(30)),
            ]
        );
    }
}
