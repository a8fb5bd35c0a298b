//! # Focusguard Core Library
//!
//! Core business logic for Focusguard, an attention-monitoring session
//! tracker. The perception engine (camera/ML) and every visual surface
//! are external collaborators; this crate owns the part with real
//! invariants: turning a noisy stream of attention classifications
//! into a well-formed session record, and coordinating the mutually
//! exclusive monitoring / interruption / break modes.
//!
//! ## Architecture
//!
//! - **Timeline Recorder**: converts `(state, timestamp)` observations
//!   into a gapless, non-overlapping interval timeline
//! - **Aggregator**: reduces a timeline (live or completed) into
//!   per-category totals and percentages
//! - **Break Countdown**: a caller-ticked, cancellable wall-clock
//!   countdown with an at-most-once completion
//! - **Mode Coordinator**: owns the recorder and countdown, drives the
//!   overlay/notifier/store collaborator handles on every transition
//! - **Storage**: JSON session documents and TOML configuration
//!
//! ## Concurrency model
//!
//! There is one logical owner context. The detection feed, countdown
//! ticks, and user actions must be marshalled onto it before calling
//! into the [`Coordinator`]; no call here blocks, and slow work
//! (persistence, inference) happens in collaborators that deliver
//! results back as discrete calls.
//!
//! ## Key Components
//!
//! - [`Coordinator`]: top-level mode state machine
//! - [`TimelineRecorder`]: session timeline construction
//! - [`BreakCountdown`]: break clock
//! - [`SessionReport`]: per-category statistics
//! - [`SessionDir`]: session persistence

pub mod coordinator;
pub mod countdown;
pub mod error;
pub mod events;
pub mod recorder;
pub mod session;
pub mod stats;
pub mod storage;

pub use coordinator::{Coordinator, Cue, Mode, Notifier, Overlay, Profile, SessionStore};
pub use countdown::{BreakCountdown, CountdownState};
pub use error::{ConfigError, CoreError, RecorderError, StorageError};
pub use events::Event;
pub use recorder::TimelineRecorder;
pub use session::{
    AttentionState, CompletedSession, DistractionKind, OpenInterval, StatCategory, StateInterval,
};
pub use stats::{HistoryReport, SessionReport};
pub use storage::{Config, SessionDir};
