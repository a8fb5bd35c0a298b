//! Session data model.
//!
//! Value types shared across the crate:
//! - [`AttentionState`]: the closed set of states the detection
//!   collaborator can report
//! - [`StateInterval`]: one closed span of a single state
//! - [`CompletedSession`]: the immutable, persistable record of a
//!   finished monitoring run
//! - [`StatCategory`]: the coarser reporting partition
//!
//! The currently-open interval is deliberately a separate type
//! ([`OpenInterval`]) owned by the recorder, so "at most one open
//! interval, always the last" holds by construction rather than by a
//! nullable `end` field.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sub-kind of a distraction observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistractionKind {
    PhoneDetected,
    FaceTurned,
    LookingAway,
}

/// A single classified attention state, as reported by the detection
/// collaborator. Immutable once constructed.
///
/// Serialized as a plain camelCase tag (`"awake"`, `"phoneDetected"`)
/// to match the persisted session schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AttentionState {
    Awake,
    EyesClosed,
    Yawning,
    HeadDown,
    Distracted(DistractionKind),
    NoFaceDetected,
    Error,
    OnBreak,
}

impl AttentionState {
    /// The stable string tag used in persisted sessions and CLI I/O.
    pub fn as_tag(&self) -> &'static str {
        match self {
            AttentionState::Awake => "awake",
            AttentionState::EyesClosed => "eyesClosed",
            AttentionState::Yawning => "yawning",
            AttentionState::HeadDown => "headDown",
            AttentionState::Distracted(DistractionKind::PhoneDetected) => "phoneDetected",
            AttentionState::Distracted(DistractionKind::FaceTurned) => "faceTurned",
            AttentionState::Distracted(DistractionKind::LookingAway) => "lookingAway",
            AttentionState::NoFaceDetected => "noFaceDetected",
            AttentionState::Error => "error",
            AttentionState::OnBreak => "onBreak",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "awake" => AttentionState::Awake,
            "eyesClosed" => AttentionState::EyesClosed,
            "yawning" => AttentionState::Yawning,
            "headDown" => AttentionState::HeadDown,
            "phoneDetected" => AttentionState::Distracted(DistractionKind::PhoneDetected),
            "faceTurned" => AttentionState::Distracted(DistractionKind::FaceTurned),
            "lookingAway" => AttentionState::Distracted(DistractionKind::LookingAway),
            "noFaceDetected" => AttentionState::NoFaceDetected,
            "error" => AttentionState::Error,
            "onBreak" => AttentionState::OnBreak,
            _ => return None,
        })
    }

    /// Total mapping into the reporting partition. Every state lands in
    /// exactly one category.
    pub fn category(&self) -> StatCategory {
        match self {
            AttentionState::Awake => StatCategory::Focus,
            AttentionState::EyesClosed | AttentionState::Yawning | AttentionState::HeadDown => {
                StatCategory::Drowsy
            }
            AttentionState::Distracted(DistractionKind::PhoneDetected) => {
                StatCategory::PhoneDistracted
            }
            AttentionState::Distracted(_) => StatCategory::Distracted,
            AttentionState::NoFaceDetected | AttentionState::Error => StatCategory::NoFace,
            AttentionState::OnBreak => StatCategory::OnBreak,
        }
    }
}

impl std::fmt::Display for AttentionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl std::str::FromStr for AttentionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AttentionState::from_tag(s).ok_or_else(|| format!("unknown attention state: {s}"))
    }
}

impl From<AttentionState> for String {
    fn from(state: AttentionState) -> String {
        state.as_tag().to_string()
    }
}

impl TryFrom<String> for AttentionState {
    type Error = String;

    fn try_from(s: String) -> Result<Self, String> {
        s.parse()
    }
}

/// Reporting-level grouping of attention states.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum StatCategory {
    Focus,
    Drowsy,
    Distracted,
    PhoneDistracted,
    NoFace,
    OnBreak,
}

impl StatCategory {
    /// Every category, in display order.
    pub const ALL: [StatCategory; 6] = [
        StatCategory::Focus,
        StatCategory::Drowsy,
        StatCategory::Distracted,
        StatCategory::PhoneDistracted,
        StatCategory::NoFace,
        StatCategory::OnBreak,
    ];

    /// The summary-card categories: tracked work time, breaks excluded.
    /// Percentage breakdowns are taken against this base, so a long
    /// break never dilutes the focus share.
    pub const DISPLAY: [StatCategory; 5] = [
        StatCategory::Focus,
        StatCategory::Drowsy,
        StatCategory::Distracted,
        StatCategory::PhoneDistracted,
        StatCategory::NoFace,
    ];
}

impl std::fmt::Display for StatCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StatCategory::Focus => "focus",
            StatCategory::Drowsy => "drowsy",
            StatCategory::Distracted => "distracted",
            StatCategory::PhoneDistracted => "phoneDistracted",
            StatCategory::NoFace => "noFace",
            StatCategory::OnBreak => "onBreak",
        };
        f.write_str(name)
    }
}

/// One closed span of a single attention state.
///
/// Within a session the sequence is contiguous: `end_i == start_{i+1}`.
/// Zero-length intervals are legal and retained for auditability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateInterval {
    pub id: Uuid,
    pub state: AttentionState,
    #[serde(rename = "startTime")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end: DateTime<Utc>,
}

impl StateInterval {
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// The in-progress tail interval of an open session. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenInterval {
    pub id: Uuid,
    pub state: AttentionState,
    pub start: DateTime<Utc>,
}

impl OpenInterval {
    pub fn new(state: AttentionState, start: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            state,
            start,
        }
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> TimeDelta {
        (now - self.start).max(TimeDelta::zero())
    }

    /// Close this interval at `end`, producing the persistable form.
    pub fn close(self, end: DateTime<Utc>) -> StateInterval {
        StateInterval {
            id: self.id,
            state: self.state,
            start: self.start,
            end,
        }
    }
}

/// The immutable record of one finished monitoring run.
///
/// This is the exact shape written to disk:
/// `{id, startTime, endTime, events: [{id, state, startTime, endTime}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSession {
    pub id: Uuid,
    #[serde(rename = "startTime")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end: DateTime<Utc>,
    pub events: Vec<StateInterval>,
}

impl CompletedSession {
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Per-interval `(state, duration)` view, the aggregator's input.
    pub fn spans(&self) -> impl Iterator<Item = (AttentionState, TimeDelta)> + '_ {
        self.events.iter().map(|e| (e.state, e.duration()))
    }
}
