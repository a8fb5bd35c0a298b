//! Mode coordinator.
//!
//! The single owner of the session/mode pair. It selects among the
//! mutually exclusive operating modes (home, monitoring, interruption
//! overlay, break), drives the timeline recorder and break countdown,
//! and invokes the narrow collaborator handles (overlay, notifier,
//! session store) on every transition.
//!
//! All mutating calls must be marshalled onto one sequential execution
//! context before they reach the coordinator; the detection feed,
//! countdown ticks, and user actions are delivered as discrete calls,
//! never concurrently. Transitions attempted from an invalid mode are
//! no-ops with a logged violation, never a panic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::countdown::BreakCountdown;
use crate::error::{RecorderError, StorageError};
use crate::events::Event;
use crate::recorder::TimelineRecorder;
use crate::session::{AttentionState, CompletedSession};

/// Monitoring profile chosen on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Interruptions surface immediately as a full-screen overlay.
    Alert,
    /// Observations are recorded but interruptions stay silent.
    Quiet,
}

/// Coordinator-level operating mode. Exactly one value at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    Home,
    Monitoring(Profile),
    /// The full-screen interruption overlay is visible.
    Interrupted(Profile),
    OnBreak(Profile),
    Summary,
    History,
}

impl Mode {
    /// Overlay visibility is a pure function of the mode.
    pub fn overlay_visible(&self) -> bool {
        matches!(self, Mode::Interrupted(_))
    }

    fn in_session(&self) -> bool {
        matches!(
            self,
            Mode::Monitoring(_) | Mode::Interrupted(_) | Mode::OnBreak(_)
        )
    }
}

/// Feedback cue delivered to the notifier collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cue {
    FocusLost,
    BreakStarted,
    BreakFinished,
    SessionComplete,
}

/// The full-screen interruption surface. The coordinator never retains
/// window identity; it only requests open/close.
pub trait Overlay {
    fn open(&mut self);
    fn close(&mut self);
}

/// Audio/notification feedback.
pub trait Notifier {
    fn notify(&mut self, cue: Cue);
}

/// Persistence collaborator for completed sessions. `save` is treated
/// as fire-and-forget by the caller; failures degrade to a pending
/// retry, never data loss.
pub trait SessionStore {
    fn save(&mut self, session: &CompletedSession) -> Result<(), StorageError>;
    fn load_all(&self) -> Result<Vec<CompletedSession>, StorageError>;
}

/// Owns the recorder, the countdown, and the collaborator handles.
pub struct Coordinator {
    mode: Mode,
    recorder: TimelineRecorder,
    countdown: BreakCountdown,
    overlay: Box<dyn Overlay>,
    notifier: Box<dyn Notifier>,
    store: Box<dyn SessionStore>,
    /// Whether an overlay open request is outstanding. Guarantees at
    /// most one overlay exists system-wide.
    overlay_open: bool,
    /// Most recently finished session, for the summary screen.
    last_session: Option<CompletedSession>,
    /// A finished session whose save failed, awaiting `retry_save`.
    pending_save: Option<CompletedSession>,
}

impl Coordinator {
    pub fn new(
        overlay: Box<dyn Overlay>,
        notifier: Box<dyn Notifier>,
        store: Box<dyn SessionStore>,
    ) -> Self {
        Self {
            mode: Mode::Home,
            recorder: TimelineRecorder::new(),
            countdown: BreakCountdown::new(),
            overlay,
            notifier,
            store,
            overlay_open: false,
            last_session: None,
            pending_save: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Read-only view of the recorder for live reporting.
    pub fn recorder(&self) -> &TimelineRecorder {
        &self.recorder
    }

    /// Remaining break budget, present only while on break.
    pub fn break_remaining_ms(&self) -> Option<u64> {
        match self.mode {
            Mode::OnBreak(_) => Some(self.countdown.remaining_ms()),
            _ => None,
        }
    }

    pub fn last_session(&self) -> Option<&CompletedSession> {
        self.last_session.as_ref()
    }

    pub fn has_pending_save(&self) -> bool {
        self.pending_save.is_some()
    }

    /// Completed sessions from the persistence collaborator.
    pub fn load_history(&self) -> Result<Vec<CompletedSession>, StorageError> {
        self.store.load_all()
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// `Home/Summary/History -> Monitoring`: opens a session.
    pub fn start_monitoring(
        &mut self,
        profile: Profile,
        at: DateTime<Utc>,
    ) -> Result<Vec<Event>, RecorderError> {
        if self.mode.in_session() {
            warn!(mode = ?self.mode, "start_monitoring ignored: session already active");
            return Ok(Vec::new());
        }
        let session_id = self.recorder.start(at)?;
        let mut events = vec![Event::MonitoringStarted { session_id, at }];
        events.push(self.set_mode(Mode::Monitoring(profile), at));
        Ok(events)
    }

    /// Record a detection observation. Applies while monitoring or
    /// interrupted (the recorder keeps observing under the overlay);
    /// dropped with a debug log otherwise.
    pub fn observe(
        &mut self,
        state: AttentionState,
        at: DateTime<Utc>,
    ) -> Result<Vec<Event>, RecorderError> {
        match self.mode {
            Mode::Monitoring(_) | Mode::Interrupted(_) => {
                let changed = self.recorder.observe(state, at)?;
                Ok(match changed {
                    Some(from) => vec![Event::StateChanged {
                        from,
                        to: state,
                        at,
                    }],
                    None => Vec::new(),
                })
            }
            Mode::OnBreak(_) => {
                debug!(%state, "observation dropped during break");
                Ok(Vec::new())
            }
            _ => {
                debug!(%state, mode = ?self.mode, "observation dropped outside session");
                Ok(Vec::new())
            }
        }
    }

    /// `Monitoring -> Interrupted`: show the overlay. The detection
    /// collaborator owns the policy of *when* to signal; the
    /// coordinator only reacts. A second signal while interrupted is
    /// a no-op, so at most one overlay is ever requested. Under the
    /// `Quiet` profile the signal is suppressed entirely: monitoring
    /// continues and no surface or cue fires.
    pub fn raise_interruption(&mut self, at: DateTime<Utc>) -> Vec<Event> {
        match self.mode {
            Mode::Monitoring(Profile::Quiet) => {
                debug!("interruption suppressed by quiet profile");
                Vec::new()
            }
            Mode::Monitoring(profile) => {
                let mode_event = self.set_mode(Mode::Interrupted(profile), at);
                self.notifier.notify(Cue::FocusLost);
                vec![Event::InterruptionRaised { at }, mode_event]
            }
            Mode::Interrupted(_) => Vec::new(),
            _ => {
                warn!(mode = ?self.mode, "interruption signal ignored outside monitoring");
                Vec::new()
            }
        }
    }

    /// `Interrupted -> Monitoring`: the user resumes focus directly.
    /// Closes the overlay; the recorder is left untouched.
    pub fn resume_focus(&mut self, at: DateTime<Utc>) -> Vec<Event> {
        match self.mode {
            Mode::Interrupted(profile) => {
                let mode_event = self.set_mode(Mode::Monitoring(profile), at);
                vec![Event::InterruptionDismissed { at }, mode_event]
            }
            _ => {
                warn!(mode = ?self.mode, "resume_focus ignored: no interruption active");
                Vec::new()
            }
        }
    }

    /// `Interrupted -> OnBreak`: the user picked a break duration.
    /// Records the `OnBreak` interval first, then arms the countdown.
    pub fn begin_break(
        &mut self,
        duration_ms: u64,
        at: DateTime<Utc>,
    ) -> Result<Vec<Event>, RecorderError> {
        let Mode::Interrupted(profile) = self.mode else {
            warn!(mode = ?self.mode, "begin_break ignored: not interrupted");
            return Ok(Vec::new());
        };
        let mut events = Vec::new();
        if let Some(from) = self.recorder.observe(AttentionState::OnBreak, at)? {
            events.push(Event::StateChanged {
                from,
                to: AttentionState::OnBreak,
                at,
            });
        }
        events.push(self.countdown.start(duration_ms, at));
        events.push(self.set_mode(Mode::OnBreak(profile), at));
        self.notifier.notify(Cue::BreakStarted);
        Ok(events)
    }

    /// `OnBreak -> Monitoring` on explicit user stop.
    pub fn stop_break(&mut self, at: DateTime<Utc>) -> Result<Vec<Event>, RecorderError> {
        let Mode::OnBreak(profile) = self.mode else {
            warn!(mode = ?self.mode, "stop_break ignored: no break active");
            return Ok(Vec::new());
        };
        let mut events = Vec::new();
        events.extend(self.countdown.stop(at));
        events.extend(self.end_break(profile, at)?);
        Ok(events)
    }

    /// Advance the countdown. Call at the tick cadence while any mode
    /// is active; performs the automatic `OnBreak -> Monitoring`
    /// hand-off when the countdown expires.
    pub fn tick(&mut self, at: DateTime<Utc>) -> Result<Vec<Event>, RecorderError> {
        let Mode::OnBreak(profile) = self.mode else {
            return Ok(Vec::new());
        };
        let Some(finished) = self.countdown.tick(at) else {
            return Ok(Vec::new());
        };
        let mut events = vec![finished];
        self.notifier.notify(Cue::BreakFinished);
        events.extend(self.end_break(profile, at)?);
        Ok(events)
    }

    /// `Monitoring/Interrupted/OnBreak -> Summary`: finish the session,
    /// hand it to the persistence collaborator, and tear down the
    /// countdown and overlay.
    pub fn stop(&mut self, at: DateTime<Utc>) -> Result<Vec<Event>, RecorderError> {
        if !self.mode.in_session() {
            warn!(mode = ?self.mode, "stop ignored: no session active");
            return Ok(Vec::new());
        }
        let mut events: Vec<Event> = self.countdown.stop(at).into_iter().collect();
        let session = self.recorder.finish(at)?;
        events.push(Event::SessionCompleted {
            session_id: session.id,
            duration_ms: session.duration().num_milliseconds().max(0) as u64,
            at,
        });
        if let Err(e) = self.store.save(&session) {
            // Fire-and-forget from the caller's view: keep the session
            // in memory as pending so it is never lost.
            error!(error = %e, session = %session.id, "session save failed; held for retry");
            self.pending_save = Some(session.clone());
        }
        self.last_session = Some(session);
        self.notifier.notify(Cue::SessionComplete);
        events.push(self.set_mode(Mode::Summary, at));
        Ok(events)
    }

    /// Retry a previously failed save. No-op when nothing is pending.
    pub fn retry_save(&mut self) -> Result<(), StorageError> {
        if let Some(session) = &self.pending_save {
            self.store.save(session)?;
            self.pending_save = None;
        }
        Ok(())
    }

    // ── Navigation (no session active) ───────────────────────────────

    pub fn go_home(&mut self, at: DateTime<Utc>) -> Vec<Event> {
        self.navigate(Mode::Home, at)
    }

    pub fn view_summary(&mut self, at: DateTime<Utc>) -> Vec<Event> {
        self.navigate(Mode::Summary, at)
    }

    pub fn view_history(&mut self, at: DateTime<Utc>) -> Vec<Event> {
        self.navigate(Mode::History, at)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn navigate(&mut self, to: Mode, at: DateTime<Utc>) -> Vec<Event> {
        if self.mode.in_session() {
            warn!(mode = ?self.mode, target = ?to, "navigation ignored during session");
            return Vec::new();
        }
        if self.mode == to {
            return Vec::new();
        }
        vec![self.set_mode(to, at)]
    }

    /// Shared `OnBreak -> Monitoring` tail for both the automatic and
    /// the user-stopped path.
    fn end_break(
        &mut self,
        profile: Profile,
        at: DateTime<Utc>,
    ) -> Result<Vec<Event>, RecorderError> {
        let mut events = Vec::new();
        if let Some(from) = self.recorder.observe(AttentionState::Awake, at)? {
            events.push(Event::StateChanged {
                from,
                to: AttentionState::Awake,
                at,
            });
        }
        events.push(self.set_mode(Mode::Monitoring(profile), at));
        Ok(events)
    }

    /// Change mode and reconcile overlay visibility with it. Open and
    /// close requests are issued at most once per edge.
    fn set_mode(&mut self, to: Mode, at: DateTime<Utc>) -> Event {
        let from = self.mode;
        self.mode = to;
        match (self.overlay_open, to.overlay_visible()) {
            (false, true) => {
                self.overlay.open();
                self.overlay_open = true;
            }
            (true, false) => {
                self.overlay.close();
                self.overlay_open = false;
            }
            _ => {}
        }
        Event::ModeChanged { from, to, at }
    }
}
