//! Replay-driven monitoring sessions.
//!
//! The perception engine is out of scope for the core, so the CLI
//! stands in for it: a JSONL script of detection-collaborator inputs
//! is replayed through a real coordinator, events stream to stdout,
//! and the finished session lands in the regular session store.
//!
//! Script records (one JSON object per line):
//!
//! ```text
//! {"type":"observe","state":"yawning","at":"2026-08-30T09:05:00Z"}
//! {"type":"interrupt","at":"..."}
//! {"type":"break","durationSecs":300,"at":"..."}
//! {"type":"stopBreak","at":"..."}
//! {"type":"resume","at":"..."}
//! {"type":"tick","at":"..."}
//! {"type":"stop","at":"..."}
//! ```

use std::io::BufRead;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::Deserialize;

use focusguard_core::stats::fmt_duration;
use focusguard_core::{
    AttentionState, Config, Coordinator, CoreError, Cue, Event, Notifier, Overlay, Profile,
    SessionDir, SessionReport, StatCategory,
};

#[derive(Subcommand)]
pub enum MonitorAction {
    /// Replay a JSONL script of detection inputs
    Replay {
        /// Script file, `-` for stdin
        file: PathBuf,
        /// Monitoring profile for the session (defaults to the
        /// configured default_profile)
        #[arg(long, value_enum)]
        profile: Option<ProfileArg>,
        /// Print raw events as JSON lines instead of a summary
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum ProfileArg {
    Alert,
    Quiet,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Profile {
        match arg {
            ProfileArg::Alert => Profile::Alert,
            ProfileArg::Quiet => Profile::Quiet,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ReplayStep {
    Observe {
        state: AttentionState,
        at: DateTime<Utc>,
    },
    Interrupt {
        at: DateTime<Utc>,
    },
    Break {
        #[serde(rename = "durationSecs")]
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    StopBreak {
        at: DateTime<Utc>,
    },
    Resume {
        at: DateTime<Utc>,
    },
    Tick {
        at: DateTime<Utc>,
    },
    Stop {
        at: DateTime<Utc>,
    },
}

impl ReplayStep {
    fn at(&self) -> DateTime<Utc> {
        match self {
            ReplayStep::Observe { at, .. }
            | ReplayStep::Interrupt { at }
            | ReplayStep::Break { at, .. }
            | ReplayStep::StopBreak { at }
            | ReplayStep::Resume { at }
            | ReplayStep::Tick { at }
            | ReplayStep::Stop { at } => *at,
        }
    }
}

/// Overlay/notifier stand-ins: transitions are logged, not rendered.
struct LogSurface;

impl Overlay for LogSurface {
    fn open(&mut self) {
        tracing::info!("overlay opened");
    }
    fn close(&mut self) {
        tracing::info!("overlay closed");
    }
}

impl Notifier for LogSurface {
    fn notify(&mut self, cue: Cue) {
        tracing::info!(?cue, "notification");
    }
}

pub fn run(action: MonitorAction) -> focusguard_core::error::Result<()> {
    match action {
        MonitorAction::Replay {
            file,
            profile,
            json,
        } => {
            let profile = profile
                .map(Profile::from)
                .unwrap_or_else(|| Config::load().default_profile);
            replay(file, profile, json)
        }
    }
}

fn replay(file: PathBuf, profile: Profile, json: bool) -> focusguard_core::error::Result<()> {
    let store = SessionDir::open_default()?;
    let mut coordinator = Coordinator::new(
        Box::new(LogSurface),
        Box::new(LogSurface),
        Box::new(store),
    );

    let reader: Box<dyn BufRead> = if file == PathBuf::from("-") {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(std::io::BufReader::new(std::fs::File::open(&file)?))
    };

    let mut all_events: Vec<Event> = Vec::new();
    let mut started = false;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let step: ReplayStep = serde_json::from_str(&line)
            .map_err(|e| CoreError::Custom(format!("line {}: {e}", lineno + 1)))?;
        let at = step.at();

        if !started {
            all_events.extend(coordinator.start_monitoring(profile, at)?);
            started = true;
        }
        // The countdown tick source shares the serialized context with
        // every other input, so each record also advances the clock.
        all_events.extend(coordinator.tick(at)?);

        let produced = match step {
            ReplayStep::Observe { state, at } => coordinator.observe(state, at)?,
            ReplayStep::Interrupt { at } => coordinator.raise_interruption(at),
            ReplayStep::Break { duration_secs, at } => {
                coordinator.begin_break(duration_secs * 1000, at)?
            }
            ReplayStep::StopBreak { at } => coordinator.stop_break(at)?,
            ReplayStep::Resume { at } => coordinator.resume_focus(at),
            ReplayStep::Tick { .. } => Vec::new(), // Already ticked above.
            ReplayStep::Stop { at } => coordinator.stop(at)?,
        };
        all_events.extend(produced);
    }

    if json {
        for event in &all_events {
            println!("{}", serde_json::to_string(event)?);
        }
        return Ok(());
    }

    match coordinator.last_session() {
        Some(session) => {
            let report = SessionReport::from_completed(session);
            print_summary(&report);
        }
        None => println!("replay ended with no finished session (missing stop record?)"),
    }
    Ok(())
}

fn print_summary(report: &SessionReport) {
    let ms = |v: u64| fmt_duration(chrono::TimeDelta::milliseconds(v as i64));
    println!(
        "session {} -- worked {} (breaks {})",
        report.session_id,
        ms(report.tracked_ms),
        ms(report.break_ms)
    );
    for category in StatCategory::DISPLAY {
        let total = report.total(category);
        if total == 0 {
            continue;
        }
        println!(
            "  {:<16} {:>8}  {:5.1}%",
            category.to_string(),
            ms(total),
            report.percent(category)
        );
    }
}
