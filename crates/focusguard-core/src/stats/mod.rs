//! Statistics module for Focusguard
//!
//! Reduces a session timeline (live or completed) into per-category
//! totals and percentage breakdowns for the summary and history
//! screens. One aggregation path serves both: anything yielding
//! `(state, duration)` spans can be aggregated.

mod report;

pub use report::{
    aggregate, percentage, HistoryReport, SessionReport, fmt_duration,
};
