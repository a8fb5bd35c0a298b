use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coordinator::Mode;
use crate::session::AttentionState;

/// Every externally visible transition produces an Event.
///
/// Coordinator commands return the events they caused; a frontend polls
/// or replays them. Serialized with a `type` tag for JSON-lines output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    MonitoringStarted {
        session_id: Uuid,
        at: DateTime<Utc>,
    },
    /// The open interval changed state (duplicate observations are
    /// absorbed and produce no event).
    StateChanged {
        from: AttentionState,
        to: AttentionState,
        at: DateTime<Utc>,
    },
    /// The detection collaborator signalled a sustained loss of focus
    /// and the interruption overlay was requested.
    InterruptionRaised {
        at: DateTime<Utc>,
    },
    /// The user resumed focus directly; the overlay was dismissed
    /// without a break.
    InterruptionDismissed {
        at: DateTime<Utc>,
    },
    BreakStarted {
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero. Fired at most once per break.
    BreakFinished {
        at: DateTime<Utc>,
    },
    /// The user cut the break short.
    BreakStopped {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        session_id: Uuid,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    ModeChanged {
        from: Mode,
        to: Mode,
        at: DateTime<Utc>,
    },
}
