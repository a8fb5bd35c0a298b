//! Session aggregation and percentage breakdowns.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::recorder::TimelineRecorder;
use crate::session::{AttentionState, CompletedSession, StatCategory};

/// Sum span durations per reporting category.
///
/// Accepts any `(state, duration)` span source, so a live recorder
/// snapshot and a completed session aggregate identically. Categories
/// with no time are absent from the map; treat absence as zero.
pub fn aggregate<I>(spans: I) -> BTreeMap<StatCategory, TimeDelta>
where
    I: IntoIterator<Item = (AttentionState, TimeDelta)>,
{
    let mut totals: BTreeMap<StatCategory, TimeDelta> = BTreeMap::new();
    for (state, duration) in spans {
        let entry = totals.entry(state.category()).or_insert_with(TimeDelta::zero);
        *entry = *entry + duration.max(TimeDelta::zero());
    }
    totals
}

/// Percentage (0.0 to 100.0) of `category` against the sum over a
/// caller-supplied subset of categories.
///
/// A zero denominator yields `0.0`, never an error, so an empty or
/// instantaneous session reports all-zero percentages.
pub fn percentage(
    totals: &BTreeMap<StatCategory, TimeDelta>,
    category: StatCategory,
    subset: &[StatCategory],
) -> f64 {
    let denom: i64 = subset
        .iter()
        .filter_map(|c| totals.get(c))
        .map(|d| d.num_milliseconds())
        .sum();
    if denom <= 0 {
        return 0.0;
    }
    let part = totals
        .get(&category)
        .map(|d| d.num_milliseconds())
        .unwrap_or(0);
    part as f64 / denom as f64 * 100.0
}

/// Per-category breakdown of one session, live or completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub start: DateTime<Utc>,
    /// Wall duration of the session in milliseconds.
    pub total_ms: u64,
    /// Time spent working, i.e. everything except breaks.
    pub tracked_ms: u64,
    /// Time spent on break.
    pub break_ms: u64,
    /// Time per category, milliseconds. Sums to `total_ms`.
    pub totals_ms: BTreeMap<StatCategory, u64>,
    /// Share of each display category against the tracked (non-break)
    /// base, 0-100. Breaks carry no share.
    pub percentages: BTreeMap<StatCategory, f64>,
}

impl SessionReport {
    /// Report over a finished session.
    pub fn from_completed(session: &CompletedSession) -> Self {
        Self::build(session.id, session.start, aggregate(session.spans()))
    }

    /// Report over the in-progress session, the open interval measured
    /// up to `now`. `None` when nothing is being recorded.
    pub fn live(recorder: &TimelineRecorder, now: DateTime<Utc>) -> Option<Self> {
        let id = recorder.session_id()?;
        let start = recorder.session_start()?;
        Some(Self::build(id, start, aggregate(recorder.spans(now))))
    }

    fn build(
        session_id: Uuid,
        start: DateTime<Utc>,
        totals: BTreeMap<StatCategory, TimeDelta>,
    ) -> Self {
        let totals_ms: BTreeMap<StatCategory, u64> = totals
            .iter()
            .map(|(c, d)| (*c, d.num_milliseconds().max(0) as u64))
            .collect();
        let total_ms: u64 = totals_ms.values().sum();
        let break_ms = totals_ms
            .get(&StatCategory::OnBreak)
            .copied()
            .unwrap_or(0);
        let percentages = StatCategory::DISPLAY
            .iter()
            .map(|c| (*c, percentage(&totals, *c, &StatCategory::DISPLAY)))
            .collect();
        Self {
            session_id,
            start,
            total_ms,
            tracked_ms: total_ms - break_ms,
            break_ms,
            totals_ms,
            percentages,
        }
    }

    pub fn total(&self, category: StatCategory) -> u64 {
        self.totals_ms.get(&category).copied().unwrap_or(0)
    }

    pub fn percent(&self, category: StatCategory) -> f64 {
        self.percentages.get(&category).copied().unwrap_or(0.0)
    }
}

/// Aggregate over many completed sessions, for the history screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryReport {
    pub sessions: u64,
    pub total_ms: u64,
    pub totals_ms: BTreeMap<StatCategory, u64>,
}

impl HistoryReport {
    pub fn from_sessions(sessions: &[CompletedSession]) -> Self {
        let mut totals_ms: BTreeMap<StatCategory, u64> = BTreeMap::new();
        for session in sessions {
            for (category, duration) in aggregate(session.spans()) {
                *totals_ms.entry(category).or_insert(0) +=
                    duration.num_milliseconds().max(0) as u64;
            }
        }
        Self {
            sessions: sessions.len() as u64,
            total_ms: totals_ms.values().sum(),
            totals_ms,
        }
    }
}

/// Human-readable duration, e.g. `2h 05m`, `12m 30s`, `45s`.
pub fn fmt_duration(duration: TimeDelta) -> String {
    let secs = duration.num_seconds().max(0);
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m:02}m")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::session::StateInterval;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn session(spans: &[(AttentionState, i64, i64)]) -> CompletedSession {
        let events: Vec<_> = spans
            .iter()
            .map(|(state, start, end)| StateInterval {
                id: Uuid::new_v4(),
                state: *state,
                start: t(*start),
                end: t(*end),
            })
            .collect();
        CompletedSession {
            id: Uuid::new_v4(),
            start: t(spans.first().map(|s| s.1).unwrap_or(0)),
            end: t(spans.last().map(|s| s.2).unwrap_or(0)),
            events,
        }
    }

    #[test]
    fn aggregate_groups_by_category() {
        let session = session(&[
            (AttentionState::Awake, 0, 300),
            (AttentionState::Yawning, 300, 900),
            (AttentionState::Awake, 900, 1200),
        ]);
        let totals = aggregate(session.spans());
        assert_eq!(totals[&StatCategory::Focus], TimeDelta::seconds(600));
        assert_eq!(totals[&StatCategory::Drowsy], TimeDelta::seconds(600));
        assert_eq!(totals.get(&StatCategory::OnBreak), None);
    }

    #[test]
    fn reference_scenario_focus_is_half() {
        let session = session(&[
            (AttentionState::Awake, 0, 300),
            (AttentionState::Yawning, 300, 900),
            (AttentionState::Awake, 900, 1200),
        ]);
        let report = SessionReport::from_completed(&session);
        assert_eq!(report.total_ms, 1_200_000);
        assert_eq!(report.total(StatCategory::Focus), 600_000);
        assert_eq!(report.total(StatCategory::Drowsy), 600_000);
        assert!((report.percent(StatCategory::Focus) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn zero_duration_session_has_zero_percentages() {
        let session = session(&[(AttentionState::Awake, 0, 0)]);
        let report = SessionReport::from_completed(&session);
        assert_eq!(report.total_ms, 0);
        for category in StatCategory::ALL {
            assert_eq!(report.percent(category), 0.0);
        }
    }

    #[test]
    fn display_set_sums_to_hundred() {
        let session = session(&[
            (AttentionState::Awake, 0, 100),
            (AttentionState::HeadDown, 100, 250),
            (AttentionState::NoFaceDetected, 250, 400),
            (AttentionState::OnBreak, 400, 700),
        ]);
        let report = SessionReport::from_completed(&session);
        let sum: f64 = StatCategory::DISPLAY
            .iter()
            .map(|c| report.percent(*c))
            .sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!((report.percent(StatCategory::Focus) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn break_time_excluded_from_percentage_base() {
        let session = session(&[
            (AttentionState::Awake, 0, 900),
            (AttentionState::OnBreak, 900, 1200),
        ]);
        let report = SessionReport::from_completed(&session);
        assert_eq!(report.total_ms, 1_200_000);
        assert_eq!(report.tracked_ms, 900_000);
        assert_eq!(report.break_ms, 300_000);
        // A break never dilutes the focus share.
        assert!((report.percent(StatCategory::Focus) - 100.0).abs() < 1e-9);
        assert_eq!(report.percent(StatCategory::OnBreak), 0.0);
    }

    #[test]
    fn percentage_over_subset() {
        let session = session(&[
            (AttentionState::Awake, 0, 600),
            (AttentionState::OnBreak, 600, 900),
        ]);
        let totals = aggregate(session.spans());
        // Against the full set the break dilutes focus...
        let all = percentage(&totals, StatCategory::Focus, &StatCategory::ALL);
        assert!((all - 200.0 / 3.0).abs() < 1e-9);
        // ...but a caller may exclude breaks from the base.
        let working = percentage(&totals, StatCategory::Focus, &[StatCategory::Focus]);
        assert!((working - 100.0).abs() < 1e-9);
    }

    #[test]
    fn live_report_matches_completed_path() {
        let mut recorder = TimelineRecorder::new();
        recorder.start(t(0)).unwrap();
        recorder.observe(AttentionState::Yawning, t(300)).unwrap();
        let live = SessionReport::live(&recorder, t(900)).unwrap();
        assert_eq!(live.total(StatCategory::Focus), 300_000);
        assert_eq!(live.total(StatCategory::Drowsy), 600_000);

        let completed = recorder.finish(t(900)).unwrap();
        let report = SessionReport::from_completed(&completed);
        assert_eq!(report.totals_ms, live.totals_ms);
    }

    #[test]
    fn history_report_sums_sessions() {
        let a = session(&[(AttentionState::Awake, 0, 600)]);
        let b = session(&[
            (AttentionState::Awake, 0, 300),
            (AttentionState::OnBreak, 300, 600),
        ]);
        let report = HistoryReport::from_sessions(&[a, b]);
        assert_eq!(report.sessions, 2);
        assert_eq!(report.totals_ms[&StatCategory::Focus], 900_000);
        assert_eq!(report.total_ms, 1_200_000);
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(fmt_duration(TimeDelta::seconds(45)), "45s");
        assert_eq!(fmt_duration(TimeDelta::seconds(750)), "12m 30s");
        assert_eq!(fmt_duration(TimeDelta::seconds(7500)), "2h 05m");
        assert_eq!(fmt_duration(TimeDelta::seconds(-5)), "0s");
    }
}
