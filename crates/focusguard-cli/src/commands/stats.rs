use clap::Subcommand;
use uuid::Uuid;

use focusguard_core::coordinator::SessionStore;
use focusguard_core::{HistoryReport, SessionDir, SessionReport};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Aggregate over every stored session
    Summary,
    /// Breakdown of one session
    Session {
        /// Session id
        id: Uuid,
    },
}

pub fn run(action: StatsAction) -> focusguard_core::error::Result<()> {
    let store = SessionDir::open_default()?;

    match action {
        StatsAction::Summary => {
            let sessions = store.load_all()?;
            let report = HistoryReport::from_sessions(&sessions);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        StatsAction::Session { id } => {
            let session = store.load(id)?;
            let report = SessionReport::from_completed(&session);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
