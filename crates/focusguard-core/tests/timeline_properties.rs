//! Property tests for the timeline recorder.
//!
//! For any sequence of observations the recorded interval list must be
//! contiguous, non-overlapping, and free of duplicate-state splits,
//! and the interval durations must sum to the session duration.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use proptest::prelude::*;

use focusguard_core::{AttentionState, DistractionKind, TimelineRecorder};

const STATES: [AttentionState; 8] = [
    AttentionState::Awake,
    AttentionState::EyesClosed,
    AttentionState::Yawning,
    AttentionState::HeadDown,
    AttentionState::Distracted(DistractionKind::PhoneDetected),
    AttentionState::Distracted(DistractionKind::FaceTurned),
    AttentionState::NoFaceDetected,
    AttentionState::OnBreak,
];

fn t(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

proptest! {
    #[test]
    fn recorded_timeline_is_well_formed(
        steps in prop::collection::vec((0usize..STATES.len(), 0i64..600), 0..50),
        tail in 0i64..600,
    ) {
        let mut recorder = TimelineRecorder::new();
        recorder.start(t(0)).unwrap();

        // Observations at non-decreasing timestamps, including repeats
        // of the same state and zero-gap pairs.
        let mut now = 0;
        let mut expected_states = vec![AttentionState::Awake];
        for (idx, gap) in steps {
            now += gap;
            let state = STATES[idx];
            recorder.observe(state, t(now)).unwrap();
            if *expected_states.last().unwrap() != state {
                expected_states.push(state);
            }
        }

        // Exactly one open interval while the session is open.
        prop_assert!(recorder.current(t(now)).is_some());
        let span_count = recorder.spans(t(now)).len();
        prop_assert_eq!(span_count, expected_states.len());

        now += tail;
        let session = recorder.finish(t(now)).unwrap();

        // Duplicate observations never created intervals.
        let states: Vec<_> = session.events.iter().map(|e| e.state).collect();
        prop_assert_eq!(states, expected_states);

        // Contiguous and non-overlapping: each interval starts exactly
        // where the previous one ended.
        prop_assert_eq!(session.events.first().unwrap().start, session.start);
        prop_assert_eq!(session.events.last().unwrap().end, session.end);
        for pair in session.events.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
            prop_assert!(pair[0].start <= pair[0].end);
        }

        // Durations sum to the session duration.
        let sum = session
            .events
            .iter()
            .fold(TimeDelta::zero(), |acc, e| acc + e.duration());
        prop_assert_eq!(sum, session.duration());
    }

    #[test]
    fn observations_before_interval_start_are_rejected(
        start in 1i64..1000,
        early in 0i64..1000,
    ) {
        prop_assume!(early < start);
        let mut recorder = TimelineRecorder::new();
        recorder.start(t(start)).unwrap();
        prop_assert!(recorder.observe(AttentionState::Yawning, t(early)).is_err());
        // The failed call left the session intact.
        prop_assert!(recorder.finish(t(start)).is_ok());
    }
}
